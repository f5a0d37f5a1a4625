use super::with_filter;
use crate::Result;
use crate::bridge::{to_native, to_value};
use cel_interpreter::Value;
use serde_json::{Value as JsonValue, json};

const DEFAULT_STATUSES: [&str; 2] = ["open", "upcoming"];

/// Health-event service names for resource types whose service name differs
const SERVICE_NAMES: &[(&str, &str)] = &[
    ("app-elb", "ELASTICLOADBALANCING"),
    ("ebs", "EBS"),
    ("efs", "ELASTICFILESYSTEM"),
    ("elb", "ELASTICLOADBALANCING"),
    ("emr", "ELASTICMAPREDUCE"),
];

/// Health events for an event filter passed through as written
///
/// # Errors
///
/// Returns an error if the filter request cannot be bridged or the filter fails.
pub fn get_raw_health_events(request: &Value) -> Result<Value> {
    let request = to_native(request)?;
    let events = with_filter("describe_health_events", |filter| filter.describe_health_events(&request))?;
    Ok(to_value(&JsonValue::Array(events)))
}

/// Health events for the policy's service in its region and globally
///
/// `statuses` defaults to `["open", "upcoming"]` when omitted, null, or empty.
///
/// # Errors
///
/// Returns an error if the statuses cannot be bridged or the filter fails.
pub fn get_health_events(_resource: &Value, statuses: Option<&Value>) -> Result<Value> {
    let statuses = match statuses.map(to_native).transpose()? {
        Some(JsonValue::Array(statuses)) if !statuses.is_empty() => statuses,
        _ => DEFAULT_STATUSES.iter().map(|s| JsonValue::from(*s)).collect(),
    };

    let events = with_filter("describe_health_events", |filter| {
        let request = json!({
            "services": [service_name(&filter.model().resource_type, &filter.model().service)],
            "regions": [filter.region(), "global"],
            "eventStatusCodes": statuses,
        });
        filter.describe_health_events(&request)
    })?;

    Ok(to_value(&JsonValue::Array(events)))
}

fn service_name(resource_type: &str, service: &str) -> String {
    SERVICE_NAMES
        .iter()
        .find(|(name, _)| *name == resource_type)
        .map_or_else(|| service.to_uppercase(), |(_, mapped)| (*mapped).to_string())
}
