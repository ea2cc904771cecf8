use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

fn record(id: u64) -> Record {
    match json!({"id": id, "name": "fixture"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn key(resource: &str, id: u64, includes: Includes) -> LookupKey {
    LookupKey::new(resource, id, includes)
}

#[tokio::test]
async fn second_lookup_with_identical_key_hits_the_cache() {
    let cache = LookupCache::new();
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
        let got = cache
            .get_or_fetch(key("leagues", 271, Includes::from("country")), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(271))
            })
            .await
            .unwrap();
        assert_eq!(got["id"], 271);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn different_include_set_is_an_independent_key() {
    let cache = LookupCache::new();
    let calls = AtomicUsize::new(0);

    for includes in [Includes::none(), Includes::from("country")] {
        cache
            .get_or_fetch(key("leagues", 271, includes), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(record(271))
            })
            .await
            .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn concurrent_lookups_share_a_single_fetch() {
    let cache = Arc::new(LookupCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch(key("countries", 320, Includes::none()), || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(record(320))
                    }
                })
                .await
        }));
    }

    for handle in handles {
        let got = handle.await.unwrap().unwrap();
        assert_eq!(got["id"], 320);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let cache = LookupCache::new();
    let calls = AtomicUsize::new(0);

    let err = cache
        .get_or_fetch(key("leagues", 271, Includes::none()), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SportmonksError::Timeout)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SportmonksError::Timeout));
    assert!(cache.is_empty());

    let got = cache
        .get_or_fetch(key("leagues", 271, Includes::none()), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(record(271))
        })
        .await
        .unwrap();
    assert_eq!(got["id"], 271);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn in_flight_failure_propagates_to_all_waiters() {
    let cache = Arc::new(LookupCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch(key("venues", 9, Includes::none()), || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(SportmonksError::Timeout)
                    }
                })
                .await
        }));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SportmonksError::Timeout | SportmonksError::Shared(_)
        ));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn clear_empties_the_cache_and_forces_a_refetch() {
    let cache = LookupCache::new();
    let calls = AtomicUsize::new(0);

    let fetch = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(record(1))
    };

    cache
        .get_or_fetch(key("continents", 1, Includes::none()), fetch)
        .await
        .unwrap();
    cache.clear();
    assert!(cache.is_empty());

    cache
        .get_or_fetch(key("continents", 1, Includes::none()), fetch)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clear_during_a_fetch_leaves_no_entry_behind() {
    let cache = Arc::new(LookupCache::new());

    let fetcher = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_fetch(key("leagues", 8, Includes::none()), || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(record(8))
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.clear();

    let got = fetcher.await.unwrap().unwrap();
    assert_eq!(got["id"], 8);
    // The fetch predates the clear, so its result is not written back.
    assert!(cache.is_empty());
}

#[tokio::test]
async fn abandoned_leader_hands_over_to_a_waiter() {
    let cache = Arc::new(LookupCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let leader = {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            cache
                .get_or_fetch(key("markets", 2, Includes::none()), || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok(record(2))
                    }
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;

    let waiter = {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            cache
                .get_or_fetch(key("markets", 2, Includes::none()), || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(record(2))
                    }
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    leader.abort();
    let _ = leader.await;

    let got = waiter.await.unwrap().unwrap();
    assert_eq!(got["id"], 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 1);
}
