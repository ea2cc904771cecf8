//! Identifier cache: process-lifetime store for resource-by-id lookups.
//!
//! Keys incorporate the exact include list, because a record normalized with
//! fewer includes is not a valid substitute for a request asking for more.
//! Entries never expire and are only removed by an explicit [`LookupCache::clear`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::oneshot;

use crate::error::{Result, SportmonksError};
use crate::query::Includes;
use crate::Record;

#[cfg(test)]
mod tests;

/// Cache key for one identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub resource: String,
    pub id: u64,
    pub includes: Includes,
}

impl LookupKey {
    pub fn new(resource: impl Into<String>, id: u64, includes: Includes) -> Self {
        LookupKey {
            resource: resource.into(),
            id,
            includes,
        }
    }
}

type SharedResult = std::result::Result<Record, Arc<SportmonksError>>;

#[derive(Debug, Default)]
struct Inner {
    /// Bumped by `clear`; a fetch started under an older epoch resolves its
    /// callers but writes no entry.
    epoch: u64,
    entries: HashMap<LookupKey, Record>,
    in_flight: HashMap<LookupKey, Vec<oneshot::Sender<SharedResult>>>,
}

/// Identifier-keyed lookup cache with at-most-one in-flight fetch per key.
///
/// Concurrent callers requesting the same key while a fetch is outstanding
/// observe a single underlying fetch and all receive the same record or the
/// same failure. Failures are never cached; the next caller retries from
/// scratch.
#[derive(Debug, Default)]
pub struct LookupCache {
    inner: Mutex<Inner>,
}

/// Cleans up the in-flight slot if the leading fetch is abandoned, waking
/// waiters so one of them can take over.
struct FlightGuard<'a> {
    cache: &'a LookupCache,
    key: &'a LookupKey,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.cache.inner.lock().unwrap();
            // Dropping the senders delivers a receive error to every waiter.
            inner.in_flight.remove(self.key);
        }
    }
}

impl LookupCache {
    pub fn new() -> Self {
        LookupCache::default()
    }

    /// Return the cached record for `key`, or run `fetch` to produce it.
    ///
    /// `fetch` is expected to perform the full paginate-and-normalize
    /// pipeline for the keyed resource; the entry is only ever written from
    /// its complete result.
    pub async fn get_or_fetch<F, Fut>(&self, key: LookupKey, fetch: F) -> Result<Record>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Record>>,
    {
        loop {
            let (epoch, waiter) = {
                let mut inner = self.inner.lock().unwrap();
                if let Some(record) = inner.entries.get(&key) {
                    debug!("cache hit: {} id={} includes={}", key.resource, key.id, key.includes.to_param());
                    return Ok(record.clone());
                }
                match inner.in_flight.entry(key.clone()) {
                    Entry::Occupied(mut slot) => {
                        let (tx, rx) = oneshot::channel();
                        slot.get_mut().push(tx);
                        (inner.epoch, Some(rx))
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(Vec::new());
                        (inner.epoch, None)
                    }
                }
            };

            let Some(rx) = waiter else {
                return self.lead_fetch(&key, epoch, fetch()).await;
            };

            match rx.await {
                Ok(Ok(record)) => return Ok(record),
                Ok(Err(shared)) => return Err(SportmonksError::Shared(shared)),
                // The leader was abandoned before completing; retry, possibly
                // becoming the new leader.
                Err(_) => continue,
            }
        }
    }

    async fn lead_fetch(
        &self,
        key: &LookupKey,
        epoch: u64,
        fetch: impl Future<Output = Result<Record>>,
    ) -> Result<Record> {
        let mut guard = FlightGuard {
            cache: self,
            key,
            armed: true,
        };

        debug!("cache miss: {} id={} includes={}", key.resource, key.id, key.includes.to_param());
        let result = fetch.await;

        let mut inner = self.inner.lock().unwrap();
        guard.armed = false;
        let waiters = inner.in_flight.remove(key).unwrap_or_default();

        match result {
            Ok(record) => {
                if inner.epoch == epoch {
                    inner.entries.insert(key.clone(), record.clone());
                }
                for tx in waiters {
                    let _ = tx.send(Ok(record.clone()));
                }
                Ok(record)
            }
            Err(err) => {
                if waiters.is_empty() {
                    return Err(err);
                }
                let shared = Arc::new(err);
                for tx in waiters {
                    let _ = tx.send(Err(Arc::clone(&shared)));
                }
                Err(SportmonksError::Shared(shared))
            }
        }
    }

    /// Drop every cached entry. Lookups already in flight complete for their
    /// callers but do not repopulate the cache.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        inner.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
