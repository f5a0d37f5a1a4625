use crate::bridge::{map_get, map_value, parse_timestamp, string_value};
use cel_interpreter::Value;

/// The `Value` of the first `{"Key": k, "Value": v}` record whose key is `name`
///
/// Records that are not maps, or lack a `Key`, are skipped. A missing key, or a matching
/// record without a `Value`, yields `null`.
#[must_use]
pub fn key(tags: &[Value], name: &str) -> Value {
    tags.iter()
        .find_map(|item| {
            let Value::Map(record) = item else {
                return None;
            };

            match map_get(record, "Key") {
                Some(Value::String(k)) if k.as_str() == name => Some(map_get(record, "Value").cloned().unwrap_or(Value::Null)),
                _ => None,
            }
        })
        .unwrap_or(Value::Null)
}

/// Decode a marked-for-op tag value of the form `message:action@action_date`
///
/// The date follows the last `@` and the action sits between the last `:` before it and
/// the `@`, so both the message and a time-of-day may contain colons. The
/// result is a map with `message`, `action` and `action_date` (a timestamp), or `null`
/// when the tag is missing, is not a string, or does not have that shape.
#[must_use]
pub fn marked_key(tags: &[Value], name: &str) -> Value {
    let Value::String(text) = key(tags, name) else {
        return Value::Null;
    };

    // The date itself may contain colons, so locate it by the last `@` first.
    let Some((head, date)) = text.rsplit_once('@') else {
        return Value::Null;
    };
    let Some((message, action)) = head.rsplit_once(':') else {
        return Value::Null;
    };
    let Some(action_date) = parse_timestamp(date) else {
        return Value::Null;
    };

    map_value([
        ("message", string_value(message)),
        ("action", string_value(action.trim())),
        ("action_date", Value::Timestamp(action_date)),
    ])
}
