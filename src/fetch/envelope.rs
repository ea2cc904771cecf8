//! Decoding of one raw API page: the `{"data": ..., "meta": ...}` envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SportmonksError};
use crate::Record;


/// Pagination block under `meta.pagination`. Endpoints that are never
/// paginated omit the whole block.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

/// The `data` node of one page, in document order.
#[derive(Debug, Clone)]
pub enum Body {
    Object(Record),
    List(Vec<Record>),
}

/// One decoded page: records plus the pagination cursor, if any.
#[derive(Debug, Clone)]
pub struct Page {
    pub body: Body,
    pub pagination: Option<Pagination>,
}

/// Decode one raw page.
///
/// Fails with `Api` when the body carries an upstream `error` object, and
/// with `MalformedResponse` when `data` is missing or neither an object nor
/// an array. Absent `meta.pagination` means "single page, no more data".
pub fn parse(raw: Value) -> Result<Page> {
    if let Some(error) = raw.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error")
            .to_string();
        return Err(SportmonksError::Api { message });
    }

    let pagination = match raw.get("meta").and_then(|m| m.get("pagination")) {
        Some(block) => Some(
            serde_json::from_value::<Pagination>(block.clone())
                .map_err(|e| SportmonksError::malformed(format!("bad pagination block: {e}")))?,
        ),
        None => None,
    };

    let data = match raw.get("data") {
        Some(data) => data.clone(),
        None => return Err(SportmonksError::malformed("missing top-level `data` node")),
    };

    let body = match data {
        Value::Object(record) => Body::Object(record),
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(record) => records.push(record),
                    other => {
                        return Err(SportmonksError::malformed(format!(
                            "`data` array element is not an object: {other}"
                        )))
                    }
                }
            }
            Body::List(records)
        }
        other => {
            return Err(SportmonksError::malformed(format!(
                "`data` node is neither an object nor an array: {other}"
            )))
        }
    };

    Ok(Page { body, pagination })
}
