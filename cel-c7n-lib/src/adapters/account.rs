use super::{str_field, with_filter};
use crate::Result;
use crate::bridge::{string_value, to_native, to_value};
use crate::filter::Filter;
use crate::transforms::flatten_schedule;
use cel_interpreter::Value;
use ohno::IntoAppError;
use serde_json::Value as JsonValue;

/// Replace `{account_id}` and `{region}` in a template with the policy's values
///
/// Useful for building URLs and queries, as in
/// `value_from(subst("s3://bucket/{account_id}/{region}/allowed.txt"))`.
///
/// # Errors
///
/// Returns an error when no filter is active.
pub fn subst(template: &str) -> Result<Value> {
    with_filter("config", |filter| {
        Ok(string_value(
            &template.replace("{account_id}", filter.account_id()).replace("{region}", filter.region()),
        ))
    })
}

/// Decode an off-hours schedule tag into per-state `{days, hour, tz}` records
///
/// The result is a map such as `{"off": [{"days": [1, 2, 3, 4, 5], "hour": 21, "tz": "pt"}]}`
/// for use as
/// `Resource.Tags.key("maid_offhours").resource_schedule().off.exists(s, Now.getDayOfWeek(s.tz) in s.days)`.
/// A missing or malformed schedule yields `null`.
///
/// # Errors
///
/// Returns an error when no filter is active.
pub fn resource_schedule(tag_value: &Value) -> Result<Value> {
    let Value::String(text) = tag_value else {
        return Ok(Value::Null);
    };

    with_filter("parse_schedule", |filter| {
        let Some(schedule) = filter.parse_schedule(text) else {
            return Ok(Value::Null);
        };

        let flattened = serde_json::to_value(flatten_schedule(&schedule)).into_app_err("unable to convert schedule")?;
        Ok(to_value(&flattened))
    })
}

/// Credential report rows for IAM users
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn credentials(_resource: &Value) -> Result<Value> {
    project("get_credential_report", |filter| filter.get_credential_report())
}

/// KMS aliases matching the policy's key filter
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn kms_alias(_resource: &Value) -> Result<Value> {
    project("get_matching_aliases", |filter| filter.get_matching_aliases())
}

/// Accounts granted access by the resource's policy
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_accounts(_resource: &Value) -> Result<Value> {
    project("get_accounts", |filter| filter.get_accounts())
}

/// VPCs named in the resource's policy conditions
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_vpcs(_resource: &Value) -> Result<Value> {
    project("get_vpcs", |filter| filter.get_vpcs())
}

/// VPC endpoints named in the resource's policy conditions
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_vpces(_resource: &Value) -> Result<Value> {
    project("get_vpces", |filter| filter.get_vpces())
}

/// Organization ids named in the resource's policy conditions
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_orgids(_resource: &Value) -> Result<Value> {
    project("get_orgids", |filter| filter.get_orgids())
}

/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_endpoints(_resource: &Value) -> Result<Value> {
    project("get_endpoints", |filter| filter.get_endpoints())
}

/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_protocols(_resource: &Value) -> Result<Value> {
    project("get_protocols", |filter| filter.get_protocols())
}

/// # Errors
///
/// Returns an error if the filter fails.
pub fn get_resource_policy(_resource: &Value) -> Result<Value> {
    project("get_resource_policy", |filter| filter.get_resource_policy())
}

/// ARNs of resources of the policy's type that Shield protects
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn shield_protection(_resource: &Value) -> Result<Value> {
    let protections = with_filter("get_type_protections", |filter| filter.get_type_protections(filter.model()))?;
    let arns = protections
        .iter()
        .filter_map(|protection| str_field(protection, "ResourceArn"))
        .map(|arn| JsonValue::String(arn.to_string()))
        .collect();
    Ok(to_value(&JsonValue::Array(arns)))
}

/// Shield subscriptions of the account
///
/// # Errors
///
/// Returns an error if the resource cannot be bridged or the filter fails.
pub fn shield_subscription(resource: &Value) -> Result<Value> {
    let resource = to_native(resource)?;
    with_filter("account_shield_subscriptions", |filter| filter.account_shield_subscriptions(&resource)).map(|subs| to_value(&subs))
}

fn project(capability: &str, call: impl FnOnce(&dyn Filter) -> Result<JsonValue>) -> Result<Value> {
    with_filter(capability, call).map(|result| to_value(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{cel, with_recording};
    use serde_json::json;

    #[test]
    fn test_subst() {
        with_recording(&json!({"account_id": "123456789012", "region": "eu-west-1"}), || {
            let text = subst("s3://bucket/{account_id}/{region}/{account_id}.txt").unwrap();
            assert_eq!(text, string_value("s3://bucket/123456789012/eu-west-1/123456789012.txt"));
            assert_eq!(subst("plain").unwrap(), string_value("plain"));
        });
    }

    #[test]
    fn test_resource_schedule() {
        with_recording(&json!({}), || {
            let schedule = resource_schedule(&string_value("off=[(M-F,21),(U,18)];on=[(M-F,6),(U,10)];tz=pt")).unwrap();
            let expected = cel(&json!({
                "off": [{"days": [1, 2, 3, 4, 5], "hour": 21, "tz": "pt"}, {"days": [0], "hour": 18, "tz": "pt"}],
                "on": [{"days": [1, 2, 3, 4, 5], "hour": 6, "tz": "pt"}, {"days": [0], "hour": 10, "tz": "pt"}]
            }));
            assert_eq!(schedule, expected);

            assert_eq!(resource_schedule(&string_value("nonsense")).unwrap(), Value::Null);
            assert_eq!(resource_schedule(&Value::Null).unwrap(), Value::Null);
        });
    }

    #[test]
    fn test_projections() {
        let doc = json!({"results": {
            "get_accounts": ["111111111111"],
            "get_vpcs": ["vpc-1"],
            "get_credential_report": [{"user": "root", "mfa_active": true}]
        }});
        with_recording(&doc, || {
            let resource = cel(&json!({}));
            assert_eq!(get_accounts(&resource).unwrap(), cel(&json!(["111111111111"])));
            assert_eq!(get_vpcs(&resource).unwrap(), cel(&json!(["vpc-1"])));
            assert_eq!(credentials(&resource).unwrap(), cel(&json!([{"user": "root", "mfa_active": true}])));
            let err = get_orgids(&resource).unwrap_err();
            assert!(err.to_string().contains("get_orgids"));
        });
    }

    #[test]
    fn test_shield_protection() {
        let doc = json!({"results": {"get_type_protections": [
            {"Id": "p-1", "ResourceArn": "arn:aws:elasticloadbalancing:us-east-1:1:loadbalancer/app/web/1"},
            {"Id": "p-2"}
        ]}});
        with_recording(&doc, || {
            let arns = shield_protection(&cel(&json!({}))).unwrap();
            assert_eq!(arns, cel(&json!(["arn:aws:elasticloadbalancing:us-east-1:1:loadbalancer/app/web/1"])));
        });
    }
}
