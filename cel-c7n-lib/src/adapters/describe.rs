use super::{required_str_field, str_field, with_filter};
use crate::Result;
use crate::bridge::{to_native, to_value};
use cel_interpreter::Value;
use ohno::app_err;
use serde_json::{Map, Value as JsonValue};

const SNAPSHOT_PERMISSION_ATTRIBUTE: &str = "createVolumePermission";

/// The default key policy of a KMS key or alias
///
/// The key is taken from `TargetKeyId`, falling back to `KeyId`.
///
/// # Errors
///
/// Returns an error if the resource names no key or the filter fails.
pub fn get_key_policy(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let key_id = str_field(&resource, "TargetKeyId")
        .or_else(|| str_field(&resource, "KeyId"))
        .ok_or_else(|| app_err!("resource has neither a 'TargetKeyId' nor a 'KeyId' field"))?;

    with_filter("get_key_policy", |filter| filter.get_key_policy(key_id)).map(|policy| to_value(&policy))
}

/// Subscription filters of a log group; empty when the resource has no `logGroupName`
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn describe_subscription_filters(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let Some(log_group_name) = str_field(&resource, "logGroupName") else {
        return Ok(to_value(&JsonValue::Array(Vec::new())));
    };

    let filters = with_filter("describe_subscription_filters", |filter| filter.describe_subscription_filters(log_group_name))?;
    Ok(to_value(&JsonValue::Array(filters)))
}

/// The volume-permission attribute of a snapshot
///
/// # Errors
///
/// Returns an error if the resource has no `SnapshotId` or the filter fails.
pub fn describe_db_snapshot_attributes(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let snapshot_id = required_str_field(&resource, "SnapshotId")?;
    with_filter("describe_snapshot_attribute", |filter| {
        filter.describe_snapshot_attribute(snapshot_id, SNAPSHOT_PERMISSION_ATTRIBUTE)
    })
    .map(|attribute| to_value(&attribute))
}

/// Attributes, including access logging, of a classic load balancer
///
/// # Errors
///
/// Returns an error if the resource has no `LoadBalancerName` or the filter fails.
pub fn get_access_log(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let name = required_str_field(&resource, "LoadBalancerName")?;
    with_filter("describe_load_balancer_attributes", |filter| filter.describe_load_balancer_attributes(name)).map(|attrs| to_value(&attrs))
}

/// Attributes of an application or network load balancer as a map
///
/// Attribute values arrive as strings; all-digit values become ints and `true`/`false`
/// become bools, so `Resource.get_load_balancer()["access_logs.s3.enabled"]` is a bool.
///
/// # Errors
///
/// Returns an error if the resource has no `LoadBalancerArn` or the filter fails.
pub fn get_load_balancer(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let arn = required_str_field(&resource, "LoadBalancerArn")?;
    let attributes = with_filter("describe_target_load_balancer_attributes", |filter| {
        filter.describe_target_load_balancer_attributes(arn)
    })?;

    let folded: Map<String, JsonValue> = attributes
        .iter()
        .filter_map(|item| {
            let key = str_field(item, "Key")?;
            let value = str_field(item, "Value").map_or(JsonValue::Null, attribute_value);
            Some((key.to_string(), value))
        })
        .collect();
    Ok(to_value(&JsonValue::Object(folded)))
}

/// Web ACL ids keyed by name
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn web_acls(_resource: &Value) -> Result<Value> {
    let wafs = with_filter("resources(waf)", |filter| filter.resources("waf"))?;
    let by_name: Map<String, JsonValue> = wafs
        .iter()
        .filter_map(|waf| Some((str_field(waf, "Name")?.to_string(), waf.get("WebACLId")?.clone())))
        .collect();
    Ok(to_value(&JsonValue::Object(by_name)))
}

fn attribute_value(text: &str) -> JsonValue {
    match text {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse::<i64>().map_or_else(|_| JsonValue::String(digits.to_string()), JsonValue::from)
        }
        other => JsonValue::String(other.to_string()),
    }
}
