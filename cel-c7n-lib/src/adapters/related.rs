use super::{str_field, with_filter};
use crate::Result;
use crate::bridge::{map_value, parse_timestamp, string_value, to_native, to_value};
use cel_interpreter::Value;
use ohno::app_err;
use serde_json::Value as JsonValue;

/// Creation date reported for resources whose image can no longer be found
const MISSING_IMAGE_CREATION_DATE: &str = "2000-01-01T01:01:01.000Z";

/// Ids of resources related to `resource`, as the filter computes them
///
/// # Errors
///
/// Returns an error if the resource cannot be bridged or the filter fails.
pub fn get_related_ids(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    with_filter("get_related_ids", |filter| filter.get_related_ids(&resource)).map(|ids| to_value(&ids))
}

/// The security group(s) with the given id
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn security_group(security_group_id: &Value) -> Result<Value> {
    related_by_id(security_group_id)
}

/// The subnet(s) with the given id
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn subnet(subnet_id: &Value) -> Result<Value> {
    related_by_id(subnet_id)
}

/// The VPC(s) with the given id
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn vpc(vpc_id: &Value) -> Result<Value> {
    related_by_id(vpc_id)
}

/// The KMS key(s) with the given id
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn kms_key(key_id: &Value) -> Result<Value> {
    related_by_id(key_id)
}

fn related_by_id(id: &Value) -> Result<Value> {
    let id = to_native(id)?;
    with_filter("get_related", |filter| filter.get_related(&[id])).map(|related| to_value(&related))
}

/// Flow logs attached to the resource, matched on the model's id field
///
/// # Errors
///
/// Returns an error if the resource cannot be bridged or the filter fails.
pub fn flow_logs(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    with_filter("describe_flow_logs", |filter| {
        let Some(resource_id) = str_field(&resource, &filter.model().id) else {
            return Ok(to_value(&JsonValue::Array(Vec::new())));
        };

        let logs: Vec<JsonValue> = filter
            .describe_flow_logs()?
            .into_iter()
            .filter(|log| str_field(log, "ResourceId") == Some(resource_id))
            .collect();
        Ok(to_value(&JsonValue::Array(logs)))
    })
}

/// Creation date and name of the image an instance was launched from
///
/// A resource whose image is gone reports a creation date of `2000-01-01T01:01:01Z` and an
/// empty name, so age checks treat it as very old.
///
/// # Errors
///
/// Returns an error if the filter fails or the image's creation date cannot be parsed.
pub fn image(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    let image = with_filter("get_instance_image", |filter| filter.get_instance_image(&resource))?;

    let (creation_date, name) = image.as_ref().map_or((MISSING_IMAGE_CREATION_DATE, ""), |image| {
        (
            str_field(image, "CreationDate").unwrap_or(MISSING_IMAGE_CREATION_DATE),
            str_field(image, "Name").unwrap_or_default(),
        )
    });

    let creation_date = parse_timestamp(creation_date).ok_or_else(|| app_err!("invalid image creation date '{creation_date}'"))?;
    Ok(map_value([("CreationDate", Value::Timestamp(creation_date)), ("Name", string_value(name))]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{cel, with_recording};
    use crate::bridge::map_get;
    use serde_json::json;

    #[test]
    fn test_related_ids_and_lookup() {
        let doc = json!({
            "related_ids": "SecurityGroups[].GroupId",
            "related": {"sg-1": {"GroupId": "sg-1", "GroupName": "web"}}
        });
        with_recording(&doc, || {
            let resource = cel(&json!({"SecurityGroups": [{"GroupId": "sg-1"}]}));
            assert_eq!(get_related_ids(&resource).unwrap(), cel(&json!(["sg-1"])));
            assert_eq!(security_group(&cel(&json!("sg-1"))).unwrap(), cel(&json!([{"GroupId": "sg-1", "GroupName": "web"}])));
            assert_eq!(subnet(&cel(&json!("subnet-9"))).unwrap(), cel(&json!([])));
        });
    }

    #[test]
    fn test_requires_active_filter() {
        let err = vpc(&cel(&json!("vpc-1"))).unwrap_err();
        assert!(err.to_string().contains("no active filter"));
    }

    #[test]
    fn test_flow_logs_match_on_model_id() {
        let doc = json!({
            "model": {"id": "VpcId"},
            "results": {"describe_flow_logs": [
                {"ResourceId": "vpc-1", "FlowLogId": "fl-1"},
                {"ResourceId": "vpc-2", "FlowLogId": "fl-2"}
            ]}
        });
        with_recording(&doc, || {
            let logs = flow_logs(&cel(&json!({"VpcId": "vpc-1"}))).unwrap();
            assert_eq!(logs, cel(&json!([{"ResourceId": "vpc-1", "FlowLogId": "fl-1"}])));

            let logs = flow_logs(&cel(&json!({"VpcId": "vpc-3"}))).unwrap();
            assert_eq!(logs, cel(&json!([])));

            let logs = flow_logs(&cel(&json!({}))).unwrap();
            assert_eq!(logs, cel(&json!([])));
        });
    }

    #[test]
    fn test_image() {
        let doc = json!({"images": {"ami-1": {"CreationDate": "2020-05-01T00:00:00.000Z", "Name": "base"}}});
        with_recording(&doc, || {
            let Value::Map(found) = image(&cel(&json!({"ImageId": "ami-1"}))).unwrap() else {
                panic!("expected a map");
            };
            let expected = parse_timestamp("2020-05-01T00:00:00Z").unwrap();
            assert_eq!(map_get(&found, "CreationDate"), Some(&Value::Timestamp(expected)));
            assert_eq!(map_get(&found, "Name"), Some(&string_value("base")));

            let Value::Map(missing) = image(&cel(&json!({"ImageId": "ami-gone"}))).unwrap() else {
                panic!("expected a map");
            };
            let expected = parse_timestamp("2000-01-01T01:01:01Z").unwrap();
            assert_eq!(map_get(&missing, "CreationDate"), Some(&Value::Timestamp(expected)));
            assert_eq!(map_get(&missing, "Name"), Some(&string_value("")));
        });
    }
}
