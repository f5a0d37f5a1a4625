//! Conversion between native JSON documents and CEL values
//!
//! Every extension function accepts and returns CEL values only. Documents coming from
//! the filter, from remote URLs, or going out to cloud API requests cross this boundary
//! exactly once, here.
//!
//! Conversion from JSON is total. Conversion back to JSON is total except for CEL values
//! that have no JSON shape (bytes, functions, non-finite doubles), which produce an
//! "unsupported type" error.
//!
//! Strings that look like dates are never converted implicitly. Call sites that need a
//! timestamp use [`parse_timestamp`] explicitly.

use crate::Result;
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use ohno::{app_err, bail};
use serde_json::{Number, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Convert a native JSON document into a CEL value
#[must_use]
pub fn to_value(native: &JsonValue) -> Value {
    match native {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => number_to_value(n),
        JsonValue::String(s) => string_value(s),
        JsonValue::Array(items) => Value::List(Arc::new(items.iter().map(to_value).collect())),
        JsonValue::Object(fields) => {
            let map: HashMap<Arc<String>, Value> = fields.iter().map(|(k, v)| (Arc::new(k.clone()), to_value(v))).collect();
            Value::Map(Map::from(map))
        }
    }
}

/// Convert a CEL value into a native JSON document
///
/// Timestamps become RFC 3339 strings and durations become a number of seconds.
///
/// # Errors
///
/// Returns an error for values with no JSON representation.
pub fn to_native(value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::UInt(u) => JsonValue::from(*u),
        Value::Float(f) => float_to_native(*f)?,
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Timestamp(ts) => JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Duration(d) => {
            #[expect(clippy::cast_precision_loss, reason = "sub-microsecond precision is irrelevant for request periods")]
            let seconds = d.num_microseconds().map_or_else(|| d.num_seconds() as f64, |us| us as f64 / 1_000_000.0);
            if seconds.fract() == 0.0 {
                JsonValue::from(d.num_seconds())
            } else {
                float_to_native(seconds)?
            }
        }
        Value::List(items) => JsonValue::Array(items.iter().map(to_native).collect::<Result<_>>()?),
        Value::Map(map) => {
            let mut fields = serde_json::Map::with_capacity(map.map.len());
            for (key, item) in map.map.iter() {
                let _ = fields.insert(key_to_string(key), to_native(item)?);
            }
            JsonValue::Object(fields)
        }
        other => bail!("unsupported type: {other:?} has no JSON representation"),
    })
}

/// Build a CEL string value
#[must_use]
pub fn string_value(s: &str) -> Value {
    Value::String(Arc::new(s.to_string()))
}

/// Build a CEL map value from string keys
#[must_use]
pub fn map_value<I>(entries: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let map: HashMap<Arc<String>, Value> = entries.into_iter().map(|(k, v)| (Arc::new(k.to_string()), v)).collect();
    Value::Map(Map::from(map))
}

/// Look up a string key in a CEL map
#[must_use]
pub fn map_get<'a>(map: &'a Map, key: &str) -> Option<&'a Value> {
    map.get(&Key::String(Arc::new(key.to_string())))
}

/// Parse a timestamp string as found in cloud documents and tag values
///
/// Accepts RFC 3339, ISO 8601 without an offset (taken as UTC), and bare dates in either
/// `YYYY-MM-DD` or `YYYY/MM/DD` form (midnight UTC).
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc().fixed_offset());
        }
    }

    None
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::UInt(u)
    } else {
        n.as_f64().map_or(Value::Null, Value::Float)
    }
}

fn float_to_native(f: f64) -> Result<JsonValue> {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or_else(|| app_err!("unsupported type: double {f} has no JSON representation"))
}

fn key_to_string(key: &Key) -> String {
    match key {
        Key::String(s) => s.to_string(),
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => u.to_string(),
        Key::Bool(b) => b.to_string(),
    }
}
