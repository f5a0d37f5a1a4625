use super::{Filter, ResourceModel};
use crate::Result;
use crate::remote::jmes_path;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err, bail};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

/// A filter that answers from previously captured data instead of live cloud calls
///
/// ```json
/// {
///   "account_id": "123456789012",
///   "region": "us-east-1",
///   "model": {"resource_type": "ec2", "service": "ec2", "id": "InstanceId",
///             "dimension": "InstanceId", "namespace": "AWS/EC2"},
///   "related_ids": "SecurityGroups[].GroupId",
///   "related": {"sg-1": {"GroupId": "sg-1", "GroupName": "default"}},
///   "images": {"ami-1": {"CreationDate": "2020-01-01T00:00:00Z", "Name": "base"}},
///   "resources": {"asg": [{"AutoScalingGroupName": "web"}]},
///   "results": {"get_accounts": ["111111111111"]}
/// }
/// ```
///
/// Capabilities that take a lookup key (a key id, a log group name, ...) expect their
/// entry in `results` to be a map from that key to the answer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedFilter {
    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub model: ResourceModel,

    /// `JMESPath` query that extracts related ids from a resource
    #[serde(default)]
    pub related_ids: Option<String>,

    /// Related resources keyed by id
    #[serde(default)]
    pub related: BTreeMap<String, JsonValue>,

    /// Images keyed by image id
    #[serde(default)]
    pub images: BTreeMap<String, JsonValue>,

    /// Resource collections keyed by resource type
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<JsonValue>>,

    /// Answers keyed by capability name
    #[serde(default)]
    pub results: BTreeMap<String, JsonValue>,
}

impl RecordedFilter {
    /// Load a recorded filter from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid recording.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading recorded filter '{path}'"))?;
        serde_json::from_str(&text).into_app_err_with(|| format!("parsing recorded filter '{path}'"))
    }

    fn result(&self, capability: &str) -> Result<JsonValue> {
        self.results
            .get(capability)
            .cloned()
            .ok_or_else(|| app_err!("recorded filter has no result for '{capability}'"))
    }

    fn list_result(&self, capability: &str) -> Result<Vec<JsonValue>> {
        match self.result(capability)? {
            JsonValue::Array(items) => Ok(items),
            other => bail!("recorded result for '{capability}' must be a list, found {other}"),
        }
    }

    fn keyed_result(&self, capability: &str, key: &str) -> Result<Option<JsonValue>> {
        match self.results.get(capability) {
            None => Ok(None),
            Some(JsonValue::Object(entries)) => Ok(entries.get(key).cloned()),
            Some(other) => bail!("recorded result for '{capability}' must be a map, found {other}"),
        }
    }

    fn id_set(&self, capability: &str) -> Result<BTreeSet<String>> {
        self.list_result(capability)?
            .into_iter()
            .map(|item| match item {
                JsonValue::String(id) => Ok(id),
                other => Err(app_err!("recorded result for '{capability}' must hold strings, found {other}")),
            })
            .collect()
    }
}

impl Filter for RecordedFilter {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn model(&self) -> &ResourceModel {
        &self.model
    }

    fn get_related_ids(&self, resource: &JsonValue) -> Result<JsonValue> {
        match &self.related_ids {
            Some(query) => jmes_path(resource, query),
            None => self.result("get_related_ids"),
        }
    }

    fn get_related(&self, ids: &[JsonValue]) -> Result<JsonValue> {
        Ok(JsonValue::Array(
            ids.iter()
                .filter_map(JsonValue::as_str)
                .filter_map(|id| self.related.get(id).cloned())
                .collect(),
        ))
    }

    fn get_instance_image(&self, resource: &JsonValue) -> Result<Option<JsonValue>> {
        Ok(resource
            .get("ImageId")
            .and_then(JsonValue::as_str)
            .and_then(|id| self.images.get(id).cloned()))
    }

    fn get_credential_report(&self) -> Result<JsonValue> {
        self.result("get_credential_report")
    }

    fn get_matching_aliases(&self) -> Result<JsonValue> {
        self.result("get_matching_aliases")
    }

    fn get_accounts(&self) -> Result<JsonValue> {
        self.result("get_accounts")
    }

    fn get_vpcs(&self) -> Result<JsonValue> {
        self.result("get_vpcs")
    }

    fn get_vpces(&self) -> Result<JsonValue> {
        self.result("get_vpces")
    }

    fn get_orgids(&self) -> Result<JsonValue> {
        self.result("get_orgids")
    }

    fn get_endpoints(&self) -> Result<JsonValue> {
        self.result("get_endpoints")
    }

    fn get_protocols(&self) -> Result<JsonValue> {
        self.result("get_protocols")
    }

    fn get_resource_policy(&self) -> Result<JsonValue> {
        self.result("get_resource_policy")
    }

    fn get_type_protections(&self, _model: &ResourceModel) -> Result<Vec<JsonValue>> {
        self.list_result("get_type_protections")
    }

    fn account_shield_subscriptions(&self, _resource: &JsonValue) -> Result<JsonValue> {
        self.result("account_shield_subscriptions")
    }

    fn service_role_usage(&self) -> Result<JsonValue> {
        self.result("service_role_usage")
    }

    fn instance_profile_usage(&self) -> Result<JsonValue> {
        self.result("instance_profile_usage")
    }

    fn scan_groups(&self) -> Result<JsonValue> {
        self.result("scan_groups")
    }

    fn pull_ec2_images(&self) -> Result<BTreeSet<String>> {
        self.id_set("pull_ec2_images")
    }

    fn pull_asg_images(&self) -> Result<BTreeSet<String>> {
        self.id_set("pull_asg_images")
    }

    fn pull_asg_snapshots(&self) -> Result<BTreeSet<String>> {
        self.id_set("pull_asg_snapshots")
    }

    fn pull_ami_snapshots(&self) -> Result<BTreeSet<String>> {
        self.id_set("pull_ami_snapshots")
    }

    fn resources(&self, resource_type: &str) -> Result<Vec<JsonValue>> {
        Ok(self.resources.get(resource_type).cloned().unwrap_or_default())
    }

    fn get_metric_statistics(&self, request: &JsonValue) -> Result<Vec<JsonValue>> {
        // Either one list for every metric, or lists keyed by metric name
        match self.results.get("get_metric_statistics") {
            Some(JsonValue::Object(by_metric)) => {
                let metric = request.get("MetricName").and_then(JsonValue::as_str).unwrap_or_default();
                Ok(by_metric.get(metric).and_then(JsonValue::as_array).cloned().unwrap_or_default())
            }
            _ => self.list_result("get_metric_statistics"),
        }
    }

    fn describe_health_events(&self, _filter: &JsonValue) -> Result<Vec<JsonValue>> {
        self.list_result("describe_health_events")
    }

    fn describe_flow_logs(&self) -> Result<Vec<JsonValue>> {
        self.list_result("describe_flow_logs")
    }

    fn get_key_policy(&self, key_id: &str) -> Result<JsonValue> {
        self.keyed_result("get_key_policy", key_id)?
            .ok_or_else(|| app_err!("recorded filter has no key policy for '{key_id}'"))
    }

    fn describe_subscription_filters(&self, log_group_name: &str) -> Result<Vec<JsonValue>> {
        Ok(self
            .keyed_result("describe_subscription_filters", log_group_name)?
            .and_then(|value| value.as_array().cloned())
            .unwrap_or_default())
    }

    fn describe_snapshot_attribute(&self, snapshot_id: &str, attribute: &str) -> Result<JsonValue> {
        self.keyed_result("describe_snapshot_attribute", snapshot_id)?
            .ok_or_else(|| app_err!("recorded filter has no '{attribute}' attribute for snapshot '{snapshot_id}'"))
    }

    fn describe_load_balancer_attributes(&self, load_balancer_name: &str) -> Result<JsonValue> {
        self.keyed_result("describe_load_balancer_attributes", load_balancer_name)?
            .ok_or_else(|| app_err!("recorded filter has no attributes for load balancer '{load_balancer_name}'"))
    }

    fn describe_target_load_balancer_attributes(&self, load_balancer_arn: &str) -> Result<Vec<JsonValue>> {
        match self.keyed_result("describe_target_load_balancer_attributes", load_balancer_arn)? {
            Some(JsonValue::Array(attributes)) => Ok(attributes),
            Some(other) => bail!("recorded attributes for '{load_balancer_arn}' must be a list, found {other}"),
            None => bail!("recorded filter has no attributes for load balancer '{load_balancer_arn}'"),
        }
    }
}
