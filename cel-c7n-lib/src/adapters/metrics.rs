use super::with_filter;
use crate::Result;
use crate::bridge::{to_native, to_value};
use cel_interpreter::Value;
use ohno::app_err;
use serde_json::{Value as JsonValue, json};

/// Datapoints for a metric-statistics request passed through as written
///
/// The request carries `Namespace`, `MetricName`, `Dimensions`, `Statistics`, `StartTime`,
/// `EndTime` and `Period`. Timestamps go out as RFC 3339 strings and durations as seconds.
///
/// # Errors
///
/// Returns an error if the request cannot be bridged or the filter fails.
pub fn get_raw_metrics(request: &Value) -> Result<Value> {
    let request = to_native(request)?;
    let datapoints = with_filter("get_metric_statistics", |filter| filter.get_metric_statistics(&request))?;
    Ok(to_value(&JsonValue::Array(datapoints)))
}

/// Values of one statistic for a resource's metric
///
/// The namespace and dimension come from the filter's resource model; the request only
/// names `MetricName`, `Statistic`, `StartTime`, `EndTime` and `Period`. Datapoints lacking
/// the statistic yield `null`.
///
/// # Errors
///
/// Returns an error if the request is missing a field, the resource type publishes no
/// metrics, or the filter fails.
pub fn get_metrics(resource: &Value, request: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let request = to_native(request)?;

    let statistic = request
        .get("Statistic")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| app_err!("metrics request has no 'Statistic' string"))?;

    let values = with_filter("get_metric_statistics", |filter| {
        let model = filter.model();
        let dimension = model
            .dimension
            .as_deref()
            .ok_or_else(|| app_err!("resource type '{}' has no metrics dimension", model.resource_type))?;

        let metric_name = request_field(&request, "MetricName")?;
        let start_time = request_field(&request, "StartTime")?;
        let end_time = request_field(&request, "EndTime")?;
        let period = request_field(&request, "Period")?;
        let dimension_value = resource.get(dimension).cloned().unwrap_or(JsonValue::Null);

        let raw_request = json!({
            "Namespace": model.namespace,
            "MetricName": metric_name,
            "Dimensions": [{"Name": dimension, "Value": dimension_value}],
            "Statistics": [statistic],
            "StartTime": start_time,
            "EndTime": end_time,
            "Period": period,
        });

        filter.get_metric_statistics(&raw_request)
    })?;

    Ok(to_value(&JsonValue::Array(
        values
            .iter()
            .map(|point| point.get(statistic).cloned().unwrap_or(JsonValue::Null))
            .collect(),
    )))
}

fn request_field<'a>(request: &'a JsonValue, name: &str) -> Result<&'a JsonValue> {
    request.get(name).ok_or_else(|| app_err!("metrics request has no '{name}' field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{cel, with_recording};
    use crate::bridge::{map_value, parse_timestamp, string_value};

    fn ec2_recording() -> JsonValue {
        json!({
            "model": {"resource_type": "ec2", "service": "ec2", "id": "InstanceId",
                      "dimension": "InstanceId", "namespace": "AWS/EC2"},
            "results": {"get_metric_statistics": {
                "CPUUtilization": [{"Average": 2.5}, {"Average": 40.0}, {"Maximum": 99.0}]
            }}
        })
    }

    fn request() -> Value {
        let now = parse_timestamp("2024-01-05T00:00:00Z").unwrap();
        map_value([
            ("MetricName", string_value("CPUUtilization")),
            ("Statistic", string_value("Average")),
            ("StartTime", Value::Timestamp(now - chrono::Duration::days(4))),
            ("EndTime", Value::Timestamp(now)),
            ("Period", Value::Duration(chrono::Duration::seconds(86_400))),
        ])
    }

    #[test]
    fn test_get_metrics_projects_statistic() {
        with_recording(&ec2_recording(), || {
            let values = get_metrics(&cel(&json!({"InstanceId": "i-1"})), &request()).unwrap();
            assert_eq!(values, cel(&json!([2.5, 40.0, null])));
        });
    }

    #[test]
    fn test_get_raw_metrics() {
        with_recording(&ec2_recording(), || {
            let raw = get_raw_metrics(&cel(&json!({"MetricName": "CPUUtilization"}))).unwrap();
            assert_eq!(raw, cel(&json!([{"Average": 2.5}, {"Average": 40.0}, {"Maximum": 99.0}])));
        });
    }

    #[test]
    fn test_missing_request_field() {
        with_recording(&ec2_recording(), || {
            let err = get_metrics(&cel(&json!({})), &cel(&json!({"Statistic": "Average"}))).unwrap_err();
            assert!(err.to_string().contains("'MetricName'"));
        });
    }

    #[test]
    fn test_model_without_dimension() {
        with_recording(&json!({"model": {"resource_type": "iam-user"}}), || {
            let err = get_metrics(&cel(&json!({})), &request()).unwrap_err();
            assert!(err.to_string().contains("no metrics dimension"));
        });
    }
}
