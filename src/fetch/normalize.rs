//! Envelope stripping and recursive unnesting of requested includes.
//!
//! Upstream wraps every related sub-resource in its own `{"data": ...}`
//! envelope, e.g. `{"country": {"data": {...}}}`. Normalization flattens that
//! to `{"country": {...}}` for each include the caller asked for. An include
//! that was requested but not returned is simply absent from the output; it
//! is never materialized as a null placeholder.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Result, SportmonksError};
use crate::query::Includes;
use crate::Record;

#[cfg(test)]
mod tests;

/// Flatten one envelope-wrapped value, unnesting recursively.
fn unnest_envelope(envelope: Record) -> Result<Value> {
    if envelope.len() > 1 {
        return Err(SportmonksError::malformed(
            "cannot flatten an envelope having keys other than `data`",
        ));
    }
    // Single-key map, checked above.
    let data = envelope.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null);

    match data {
        Value::Object(inner) => Ok(Value::Object(unnest_record(inner)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(inner) => out.push(Value::Object(unnest_record(inner)?)),
                    other => out.push(other),
                }
            }
            Ok(Value::Array(out))
        }
        scalar => Ok(scalar),
    }
}

/// Unnest every envelope-wrapped field of a record, recursively. Used below
/// the top level, where upstream only embeds sub-includes that were requested
/// via dotted include names.
fn unnest_record(record: Record) -> Result<Record> {
    let mut out = Record::new();
    for (key, value) in record {
        let value = match value {
            Value::Object(map) if map.contains_key("data") => unnest_envelope(map)?,
            other => other,
        };
        out.insert(key, value);
    }
    Ok(out)
}

/// Normalize one raw record against the includes the query requested.
///
/// Requested includes are unnested in place, preserving document order.
/// Include-shaped fields that were not requested are stripped, so the output
/// contains exactly the include keys that were both requested and present
/// upstream. Plain fields pass through unexamined. A requested include that
/// arrives as something other than an envelope fails with
/// `MalformedResponse`.
pub fn normalize(record: Record, includes: &Includes) -> Result<Record> {
    // Dotted names like `results.league` request nesting below the
    // `results` include; only the first segment names a top-level field.
    let requested: HashSet<&str> = includes
        .names()
        .iter()
        .filter_map(|name| name.split('.').next())
        .collect();

    let mut out = Record::new();
    for (key, value) in record {
        match value {
            Value::Object(map) if map.contains_key("data") => {
                if requested.contains(key.as_str()) {
                    out.insert(key, unnest_envelope(map)?);
                } else if map.len() == 1 {
                    // Unrequested include-shaped fields are dropped.
                } else {
                    // A multi-key object is not an envelope, even with a
                    // `data` key among its fields; it is a plain field.
                    out.insert(key, Value::Object(map));
                }
            }
            Value::Null if requested.contains(key.as_str()) => {
                // Upstream signalled absence; omit rather than keep the null.
            }
            other => {
                if requested.contains(key.as_str()) {
                    return Err(SportmonksError::malformed(format!(
                        "include `{key}` is not envelope-wrapped: {other}"
                    )));
                }
                out.insert(key, other);
            }
        }
    }
    Ok(out)
}
