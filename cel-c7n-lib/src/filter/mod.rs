//! The policy engine's filter, as seen from policy expressions
//!
//! A [`Filter`] is the bridge to the cloud: it owns the clients, caches, and resource
//! managers of one running policy. Extension functions never receive it as an argument.
//! Instead the evaluation entry point installs it in a per-thread slot ([`FilterScope`])
//! for the duration of one evaluation, and capability functions fetch it with
//! [`active_filter`].
//!
//! Every capability has a default implementation that fails, so a filter only implements
//! what its resource type needs. [`RecordedFilter`] answers from a JSON document and is
//! what the command line uses.

mod ambient;
mod recorded;
mod resource_model;

pub use ambient::{FilterScope, active_filter, is_active};
pub use recorded::RecordedFilter;
pub use resource_model::ResourceModel;

use crate::Result;
use crate::transforms::{self, ParsedSchedule};
use core::fmt::Debug;
use ohno::bail;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// The capability surface of a policy filter
///
/// Results are native JSON documents shaped like the cloud API responses they come from.
/// Caching, retries, and pagination are the implementation's business.
pub trait Filter: Debug {
    /// Account the policy is running against
    fn account_id(&self) -> &str;

    /// Region the policy is running in
    fn region(&self) -> &str;

    /// Metadata describing the policy's resource type
    fn model(&self) -> &ResourceModel;

    /// Ids of resources related to `resource`, such as its security groups
    fn get_related_ids(&self, _resource: &JsonValue) -> Result<JsonValue> {
        unsupported("get_related_ids")
    }

    /// Related resources for a list of ids
    fn get_related(&self, _ids: &[JsonValue]) -> Result<JsonValue> {
        unsupported("get_related")
    }

    /// The image an instance or auto-scaling group was launched from, if known
    fn get_instance_image(&self, _resource: &JsonValue) -> Result<Option<JsonValue>> {
        unsupported("get_instance_image")
    }

    fn get_credential_report(&self) -> Result<JsonValue> {
        unsupported("get_credential_report")
    }

    fn get_matching_aliases(&self) -> Result<JsonValue> {
        unsupported("get_matching_aliases")
    }

    /// Accounts granted access by the resource's policy
    fn get_accounts(&self) -> Result<JsonValue> {
        unsupported("get_accounts")
    }

    fn get_vpcs(&self) -> Result<JsonValue> {
        unsupported("get_vpcs")
    }

    fn get_vpces(&self) -> Result<JsonValue> {
        unsupported("get_vpces")
    }

    fn get_orgids(&self) -> Result<JsonValue> {
        unsupported("get_orgids")
    }

    fn get_endpoints(&self) -> Result<JsonValue> {
        unsupported("get_endpoints")
    }

    fn get_protocols(&self) -> Result<JsonValue> {
        unsupported("get_protocols")
    }

    fn get_resource_policy(&self) -> Result<JsonValue> {
        unsupported("get_resource_policy")
    }

    /// Shield protections that apply to resources of `model`'s type
    fn get_type_protections(&self, _model: &ResourceModel) -> Result<Vec<JsonValue>> {
        unsupported("get_type_protections")
    }

    fn account_shield_subscriptions(&self, _resource: &JsonValue) -> Result<JsonValue> {
        unsupported("account_shield_subscriptions")
    }

    /// Roles referenced by any service resource
    fn service_role_usage(&self) -> Result<JsonValue> {
        unsupported("service_role_usage")
    }

    /// Instance profiles referenced by any instance or launch configuration
    fn instance_profile_usage(&self) -> Result<JsonValue> {
        unsupported("instance_profile_usage")
    }

    /// Security groups referenced by any other resource
    fn scan_groups(&self) -> Result<JsonValue> {
        unsupported("scan_groups")
    }

    /// Image ids used by instances
    fn pull_ec2_images(&self) -> Result<BTreeSet<String>> {
        unsupported("pull_ec2_images")
    }

    /// Image ids used by auto-scaling groups
    fn pull_asg_images(&self) -> Result<BTreeSet<String>> {
        unsupported("pull_asg_images")
    }

    /// Snapshot ids used by auto-scaling groups
    fn pull_asg_snapshots(&self) -> Result<BTreeSet<String>> {
        unsupported("pull_asg_snapshots")
    }

    /// Snapshot ids backing images
    fn pull_ami_snapshots(&self) -> Result<BTreeSet<String>> {
        unsupported("pull_ami_snapshots")
    }

    /// Every resource of another type, such as `asg` or `rds`
    fn resources(&self, resource_type: &str) -> Result<Vec<JsonValue>> {
        unsupported(&format!("resources({resource_type})"))
    }

    /// Datapoints from a metric-statistics request
    fn get_metric_statistics(&self, _request: &JsonValue) -> Result<Vec<JsonValue>> {
        unsupported("get_metric_statistics")
    }

    /// Health events matching an event filter
    fn describe_health_events(&self, _filter: &JsonValue) -> Result<Vec<JsonValue>> {
        unsupported("describe_health_events")
    }

    fn describe_flow_logs(&self) -> Result<Vec<JsonValue>> {
        unsupported("describe_flow_logs")
    }

    /// The default key policy document of a key
    fn get_key_policy(&self, _key_id: &str) -> Result<JsonValue> {
        unsupported("get_key_policy")
    }

    fn describe_subscription_filters(&self, _log_group_name: &str) -> Result<Vec<JsonValue>> {
        unsupported("describe_subscription_filters")
    }

    fn describe_snapshot_attribute(&self, _snapshot_id: &str, _attribute: &str) -> Result<JsonValue> {
        unsupported("describe_snapshot_attribute")
    }

    /// Attributes of a classic load balancer
    fn describe_load_balancer_attributes(&self, _load_balancer_name: &str) -> Result<JsonValue> {
        unsupported("describe_load_balancer_attributes")
    }

    /// `{"Key": k, "Value": v}` attributes of an application or network load balancer
    fn describe_target_load_balancer_attributes(&self, _load_balancer_arn: &str) -> Result<Vec<JsonValue>> {
        unsupported("describe_target_load_balancer_attributes")
    }

    /// Decode an off-hours schedule tag
    fn parse_schedule(&self, text: &str) -> Option<ParsedSchedule> {
        transforms::parse_schedule(text)
    }
}

fn unsupported<T>(capability: &str) -> Result<T> {
    bail!("the active filter does not support '{capability}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct BareFilter {
        model: ResourceModel,
    }

    impl Filter for BareFilter {
        fn account_id(&self) -> &str {
            "123456789012"
        }

        fn region(&self) -> &str {
            "us-east-1"
        }

        fn model(&self) -> &ResourceModel {
            &self.model
        }
    }

    #[test]
    fn test_capabilities_default_to_errors() {
        let filter = BareFilter::default();
        let err = filter.get_credential_report().unwrap_err();
        assert!(err.to_string().contains("does not support 'get_credential_report'"));

        let err = filter.resources("asg").unwrap_err();
        assert!(err.to_string().contains("resources(asg)"));
    }

    #[test]
    fn test_default_schedule_parser() {
        let filter = BareFilter::default();
        assert!(filter.parse_schedule("off=(M-F,19)").is_some());
        assert!(filter.parse_schedule("garbage").is_none());
    }
}
