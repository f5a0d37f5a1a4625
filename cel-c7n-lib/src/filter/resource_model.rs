use serde::{Deserialize, Serialize};

/// What the policy engine knows about a resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceModel {
    /// The policy's resource type, such as `ec2` or `app-elb`
    #[serde(default)]
    pub resource_type: String,

    /// The cloud service that owns the type, such as `ec2` or `elasticloadbalancing`
    #[serde(default)]
    pub service: String,

    /// The field of a resource document that holds its id
    #[serde(default)]
    pub id: String,

    /// The metrics dimension name for the type, when it publishes metrics
    #[serde(default)]
    pub dimension: Option<String>,

    /// The metrics namespace for the type, such as `AWS/EC2`
    #[serde(default)]
    pub namespace: String,
}
