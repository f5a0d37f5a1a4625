//! Capability functions: project the active filter into CEL
//!
//! Each adapter reads the ambient filter, makes exactly one capability call, and bridges
//! the answer back into a CEL value. None of them keep state between calls.

mod account;
mod describe;
mod health;
mod inventory;
mod metrics;
mod related;

pub use account::{
    credentials, get_accounts, get_endpoints, get_orgids, get_protocols, get_resource_policy, get_vpces, get_vpcs, kms_alias,
    resource_schedule, shield_protection, shield_subscription, subst,
};
pub use describe::{describe_db_snapshot_attributes, describe_subscription_filters, get_access_log, get_key_policy, get_load_balancer, web_acls};
pub use health::{get_health_events, get_raw_health_events};
pub use inventory::{
    all_dbsubenet_groups, all_images, all_instance_profiles, all_launch_configuration_names, all_scan_groups, all_service_roles,
    all_snapshots,
};
pub use metrics::{get_metrics, get_raw_metrics};
pub use related::{flow_logs, get_related_ids, image, kms_key, security_group, subnet, vpc};

use crate::Result;
use crate::filter::{Filter, active_filter};
use ohno::app_err;
use serde_json::Value as JsonValue;

const LOG_TARGET: &str = "  adapters";

/// Run `f` against the active filter
fn with_filter<T>(capability: &str, f: impl FnOnce(&dyn Filter) -> Result<T>) -> Result<T> {
    let filter = active_filter()?;
    log::trace!(target: LOG_TARGET, "Calling filter capability '{capability}'");
    f(filter.as_ref())
}

/// A string field of a resource document
fn str_field<'a>(resource: &'a JsonValue, name: &str) -> Option<&'a str> {
    resource.get(name).and_then(JsonValue::as_str)
}

fn required_str_field<'a>(resource: &'a JsonValue, name: &str) -> Result<&'a str> {
    str_field(resource, name).ok_or_else(|| app_err!("resource has no '{name}' string field"))
}

#[cfg(test)]
mod test_support {
    use crate::bridge::to_value;
    use crate::filter::{FilterScope, RecordedFilter};
    use cel_interpreter::Value;
    use serde_json::Value as JsonValue;
    use std::sync::Arc;

    /// Run `f` with a recorded filter built from `doc` in the ambient slot
    pub fn with_recording<T>(doc: &JsonValue, f: impl FnOnce() -> T) -> T {
        let filter: RecordedFilter = serde_json::from_value(doc.clone()).unwrap();
        let _scope = FilterScope::enter(Arc::new(filter));
        f()
    }

    pub fn cel(doc: &JsonValue) -> Value {
        to_value(doc)
    }
}
