use super::{str_field, with_filter};
use crate::Result;
use crate::bridge::to_value;
use cel_interpreter::Value;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// Image ids in use by instances or auto-scaling groups
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_images() -> Result<Value> {
    let mut images = with_filter("pull_ec2_images", |filter| filter.pull_ec2_images())?;
    images.extend(with_filter("pull_asg_images", |filter| filter.pull_asg_images())?);
    Ok(id_list(images))
}

/// Snapshot ids in use by auto-scaling groups or images
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_snapshots() -> Result<Value> {
    let mut snapshots = with_filter("pull_asg_snapshots", |filter| filter.pull_asg_snapshots())?;
    snapshots.extend(with_filter("pull_ami_snapshots", |filter| filter.pull_ami_snapshots())?);
    Ok(id_list(snapshots))
}

/// Launch configurations referenced by auto-scaling groups that do not use a launch template
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_launch_configuration_names() -> Result<Value> {
    let groups = with_filter("resources(asg)", |filter| filter.resources("asg"))?;
    let used = groups
        .iter()
        .filter(|group| group.get("LaunchTemplate").is_none_or(JsonValue::is_null))
        .filter_map(|group| str_field(group, "LaunchConfigurationName").or_else(|| str_field(group, "AutoScalingGroupName")))
        .map(ToString::to_string)
        .collect();
    Ok(id_list(used))
}

/// Subnet groups referenced by database instances
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_dbsubenet_groups() -> Result<Value> {
    let instances = with_filter("resources(rds)", |filter| filter.resources("rds"))?;
    let used = instances
        .iter()
        .filter_map(|db| str_field(db, "DBSubnetGroupName").or_else(|| str_field(db, "DBInstanceIdentifier")))
        .map(ToString::to_string)
        .collect();
    Ok(id_list(used))
}

/// Roles in use by any service
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_service_roles() -> Result<Value> {
    with_filter("service_role_usage", |filter| filter.service_role_usage()).map(|roles| to_value(&sorted_unique(roles)))
}

/// Instance profiles in use by any instance or launch configuration
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_instance_profiles() -> Result<Value> {
    with_filter("instance_profile_usage", |filter| filter.instance_profile_usage()).map(|profiles| to_value(&sorted_unique(profiles)))
}

/// Security groups in use by any resource
///
/// # Errors
///
/// Returns an error if the filter fails.
pub fn all_scan_groups() -> Result<Value> {
    with_filter("scan_groups", |filter| filter.scan_groups()).map(|groups| to_value(&sorted_unique(groups)))
}

fn id_list(ids: BTreeSet<String>) -> Value {
    to_value(&JsonValue::Array(ids.into_iter().map(JsonValue::String).collect()))
}

/// Sort and de-duplicate a list of strings; anything else passes through
fn sorted_unique(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => {
            let unique: BTreeSet<String> = items.into_iter().filter_map(|item| item.as_str().map(ToString::to_string)).collect();
            JsonValue::Array(unique.into_iter().map(JsonValue::String).collect())
        }
        other => other,
    }
}
