//! Running a policy expression against one resource

use super::{Activation, PolicyExpression};
use crate::Result;
use crate::bridge::to_value;
use crate::filter::{Filter, FilterScope};
use crate::registry;
use cel_interpreter::{Context, Value};
use ohno::{IntoAppError, app_err};
use std::sync::Arc;

const LOG_TARGET: &str = " evaluator";

/// Evaluate an expression with `filter` installed as the active filter
///
/// The filter is only reachable by capability functions while this call runs. It is
/// removed again on every exit path, including errors and panics.
///
/// # Errors
///
/// Returns an error if evaluation fails, including failures raised by extension functions.
pub fn evaluate(expression: &PolicyExpression, activation: &Activation, filter: Arc<dyn Filter>) -> Result<Value> {
    log::debug!(target: LOG_TARGET, "Evaluating expression '{}'", expression.name());

    let context = build_cel_context(activation);
    let _scope = FilterScope::enter(filter);

    expression
        .program()
        .execute(&context)
        .into_app_err(format!("Could not evaluate expression '{}'", expression.name()))
}

/// Evaluate an expression that must produce a boolean
///
/// # Errors
///
/// Returns an error if evaluation fails or the expression returns a non-boolean value.
pub fn matches(expression: &PolicyExpression, activation: &Activation, filter: Arc<dyn Filter>) -> Result<bool> {
    match evaluate(expression, activation, filter)? {
        Value::Bool(b) => Ok(b),
        other => Err(app_err!(
            "Expression '{}' did not return a boolean, got '{other:?}' instead",
            expression.name()
        )),
    }
}

fn build_cel_context(activation: &Activation) -> Context<'static> {
    let mut context = Context::default();
    registry::register(&mut context);

    context.add_variable_from_value("Resource", to_value(&activation.resource));
    context.add_variable_from_value("Now", Value::Timestamp(activation.now));
    context.add_variable_from_value("Event", activation.event.as_ref().map_or(Value::Null, to_value));

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{RecordedFilter, ResourceModel, is_active};
    use chrono::{DateTime, FixedOffset};
    use serde_json::{Value as JsonValue, json};

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-05T10:30:00Z").unwrap()
    }

    fn filter() -> Arc<dyn Filter> {
        Arc::new(RecordedFilter {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            model: ResourceModel {
                resource_type: "ec2".to_string(),
                service: "ec2".to_string(),
                id: "InstanceId".to_string(),
                ..ResourceModel::default()
            },
            ..RecordedFilter::default()
        })
    }

    fn expr(text: &str) -> PolicyExpression {
        PolicyExpression::new("test".to_string(), None, text.to_string()).unwrap()
    }

    fn eval_bool(text: &str, resource: JsonValue) -> Result<bool> {
        matches(&expr(text), &Activation::new(resource, now()), filter())
    }

    #[test]
    fn test_resource_binding() {
        let resource = json!({"InstanceId": "i-1", "State": {"Name": "running"}});
        assert!(eval_bool(r#"Resource.State.Name == "running""#, resource.clone()).unwrap());
        assert!(!eval_bool(r#"Resource.InstanceId == "i-2""#, resource).unwrap());
    }

    #[test]
    fn test_now_binding() {
        assert!(eval_bool(r#"Now > timestamp("2024-01-01T00:00:00Z")"#, json!({})).unwrap());
        assert!(eval_bool("Now.getDayOfWeek() == 3", json!({})).unwrap());
    }

    #[test]
    fn test_event_defaults_to_null() {
        assert!(eval_bool("Event == null", json!({})).unwrap());

        let activation = Activation::new(json!({}), now()).with_event(json!({"detail": {"eventName": "RunInstances"}}));
        assert!(matches(&expr(r#"Event.detail.eventName == "RunInstances""#), &activation, filter()).unwrap());
    }

    #[test]
    fn test_pure_extension_functions() {
        let resource = json!({
            "Tags": [{"Key": "Name", "Value": "web-01"}],
            "CidrBlock": "10.1.0.0/16"
        });
        assert!(eval_bool(r#"Resource.Tags.key("Name").glob("web-*")"#, resource.clone()).unwrap());
        assert!(eval_bool(r#"Resource.Tags.key("Owner") == null"#, resource.clone()).unwrap());
        assert!(eval_bool(r#"cidr_contains("10.0.0.0/8", Resource.CidrBlock)"#, resource).unwrap());
    }

    #[test]
    fn test_version_comparison_operators() {
        let resource = json!({"EngineVersion": "5.7.mysql_aurora.2.10.2"});
        assert!(eval_bool(r#"version(Resource.EngineVersion) > version("5.7.mysql_aurora.2.09")"#, resource.clone()).unwrap());
        assert!(eval_bool(r#"Resource.EngineVersion.version() > "5.7".version()"#, resource).unwrap());
        assert!(eval_bool(r#"version("1.2") < version("1.10")"#, json!({})).unwrap());
        assert!(eval_bool(r#"version("1.0") == version("1.0.0")"#, json!({})).unwrap());
    }

    #[test]
    fn test_version_numeric_against_alphabetic_run() {
        assert!(!eval_bool(r#"version("1.0") == version("1.a")"#, json!({})).unwrap());
        assert!(eval_bool(r#"version("1.0") != version("1.a")"#, json!({})).unwrap());
        assert!(eval_bool(r#"version("1.0") < version("1.a")"#, json!({})).unwrap());
        assert!(eval_bool(r#"version("1.10") < version("1.10rc1")"#, json!({})).unwrap());
        assert!(eval_bool(r#"version("2") > version("1.a")"#, json!({})).unwrap());
    }

    #[test]
    fn test_capability_functions_see_the_filter() {
        assert!(eval_bool(r#"subst("{account_id}/{region}") == "123456789012/us-east-1""#, json!({})).unwrap());
        assert!(!is_active());
    }

    #[test]
    fn test_schedule_against_now() {
        let resource = json!({"Tags": [{"Key": "maid_offhours", "Value": "off=[(M-F,19)];on=[(M-F,7)];tz=pt"}]});
        let text = r#"Resource.Tags.key("maid_offhours").resource_schedule().off.exists(s, Now.getDayOfWeek() in s.days && s.tz == "pt")"#;
        assert!(eval_bool(text, resource).unwrap());
    }

    #[test]
    fn test_non_boolean_result() {
        let err = eval_bool("Resource.Count", json!({"Count": 3})).unwrap_err();
        assert!(err.to_string().contains("did not return a boolean"));

        let value = evaluate(&expr("Resource.Count + 1"), &Activation::new(json!({"Count": 3}), now()), filter()).unwrap();
        assert_eq!(value, Value::Int(4));
    }

    #[test]
    fn test_slot_cleared_after_failure() {
        let err = eval_bool(r#"arn_split("not-an-arn", "service") == "s3""#, json!({})).unwrap_err();
        assert!(err.to_string().contains("Could not evaluate expression 'test'"));
        assert!(!is_active());
    }

    #[test]
    fn test_slot_cleared_after_success() {
        assert!(eval_bool("true", json!({})).unwrap());
        assert!(!is_active());
    }
}
