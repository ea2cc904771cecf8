//! Sequential page walking: collect every page of a query, in order.

use std::collections::HashSet;

use log::debug;
use url::Url;

use crate::client::SoccerClient;
use crate::error::{Result, SportmonksError};
use crate::fetch::envelope::{self, Body};
use crate::query::{ForeignKeyFilter, Query};
use crate::Record;


/// Extract the page number named by a `next_page` locator URL.
fn next_page_number(locator: &str) -> Result<u32> {
    let url = Url::parse(locator)
        .map_err(|e| SportmonksError::malformed(format!("bad next_page locator: {e}")))?;
    let page = url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| {
            SportmonksError::malformed("next_page locator carries no page parameter")
        })?;
    page.parse()
        .map_err(|_| SportmonksError::malformed(format!("non-numeric page locator: {page}")))
}

/// Drop records whose foreign key is not in the requested set. Correctness
/// fix for endpoints where the API stops honoring the filter beyond page 1.
fn apply_post_filter(records: &mut Vec<Record>, filter: &ForeignKeyFilter) {
    let before = records.len();
    records.retain(|record| {
        record
            .get(&filter.field)
            .and_then(serde_json::Value::as_i64)
            .is_some_and(|id| filter.allowed.contains(&id))
    });
    if records.len() != before {
        debug!(
            "post-filter on `{}` dropped {} over-returned records",
            filter.field,
            before - records.len()
        );
    }
}

/// Fetch every page of `query` and merge the records in page-then-source
/// order. Any transport or parse failure aborts the whole run; no partial
/// result is ever returned.
pub(crate) async fn fetch_all(client: &SoccerClient, query: &Query) -> Result<Body> {
    let mut merged: Vec<Record> = Vec::new();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut page = query.first_page();
    let mut first = true;

    loop {
        visited.insert(page);
        let raw = client.get_page(query.path(), &query.params_for_page(page)).await?;
        let parsed = envelope::parse(raw)?;

        match parsed.body {
            Body::Object(record) => {
                if first {
                    // Single-object responses are never paginated.
                    return Ok(Body::Object(record));
                }
                return Err(SportmonksError::malformed(
                    "paginated response switched to a single object",
                ));
            }
            Body::List(records) => {
                debug!("page {page} of `{}`: {} records", query.path(), records.len());
                merged.extend(records);
            }
        }

        match parsed.pagination.as_ref().and_then(|p| p.next_page.as_deref()) {
            None => break,
            Some(locator) => {
                let next = next_page_number(locator)?;
                if visited.contains(&next) {
                    return Err(SportmonksError::PaginationLoop { page: next });
                }
                page = next;
                first = false;
            }
        }
    }

    if let Some(filter) = query.filter() {
        apply_post_filter(&mut merged, filter);
    }

    Ok(Body::List(merged))
}
