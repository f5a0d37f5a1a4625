//! The fixed table of extension functions
//!
//! Every function is registered with the evaluator under its name, and all of them share
//! one handler ([`invoke`]) that recovers the function from the name it was called by.
//! Functions can be called either way round: `key(Resource.Tags, "Name")` and
//! `Resource.Tags.key("Name")` are the same call, the method receiver becoming the first
//! argument.

mod call_args;

pub use call_args::CallArgs;

use crate::Result;
use crate::adapters;
use crate::bridge::{string_value, to_native, to_value};
use crate::remote::{jmes_path, jmes_path_map, text_from, value_from};
use crate::transforms::{
    Version, absent, arn_split, cidr_contains, difference, glob, intersect, key, marked_key, normalize, parse_cidr, present,
    size_parse_cidr, unique_size,
};
use cel_interpreter::extractors::Arguments;
use cel_interpreter::{Context, ExecutionError, FunctionContext, Value};
use core::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// An extension function, named as policies call it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExtensionFunction {
    // Pure transforms
    Glob,
    Difference,
    Intersect,
    Normalize,
    ParseCidr,
    SizeParseCidr,
    CidrContains,
    CidrSize,
    UniqueSize,
    Version,
    Present,
    Absent,
    Key,
    MarkedKey,
    ArnSplit,

    // Remote documents
    TextFrom,
    ValueFrom,
    JmesPath,
    JmesPathMap,

    // Filter capabilities
    Subst,
    ResourceSchedule,
    Image,
    GetRawMetrics,
    GetMetrics,
    GetRawHealthEvents,
    GetHealthEvents,
    GetRelatedIds,
    SecurityGroup,
    Subnet,
    FlowLogs,
    Vpc,
    Credentials,
    KmsAlias,
    KmsKey,
    GetAccounts,
    GetVpcs,
    GetVpces,
    GetOrgids,
    GetEndpoints,
    GetProtocols,
    GetKeyPolicy,
    GetResourcePolicy,
    DescribeSubscriptionFilters,
    DescribeDbSnapshotAttributes,
    AllImages,
    AllSnapshots,
    AllLaunchConfigurationNames,
    AllServiceRoles,
    AllInstanceProfiles,
    AllDbsubenetGroups,
    AllScanGroups,
    GetAccessLog,
    GetLoadBalancer,
    ShieldProtection,
    ShieldSubscription,
    WebAcls,
}

impl ExtensionFunction {
    /// The name the evaluator binds this function under
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// A human-readable signature, receiver first
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Glob => "glob(text: string, pattern: string) -> bool",
            Self::Difference => "difference(left: list, right: list) -> bool",
            Self::Intersect => "intersect(left: list, right: list) -> bool",
            Self::Normalize => "normalize(text: string) -> string",
            Self::ParseCidr => "parse_cidr(text: string) -> string | null",
            Self::SizeParseCidr => "size_parse_cidr(text: string) -> int | null",
            Self::CidrContains => "cidr_contains(container: string | null, candidate: string | null) -> bool",
            Self::CidrSize => "cidr_size(cidr: string | null) -> int | null",
            Self::UniqueSize => "unique_size(items: list) -> int",
            Self::Version => "version(text: string) -> string",
            Self::Present => "present(value: any) -> bool",
            Self::Absent => "absent(value: any) -> bool",
            Self::Key => "key(tags: list, name: string) -> any",
            Self::MarkedKey => "marked_key(tags: list, name: string) -> map | null",
            Self::ArnSplit => "arn_split(arn: string, field: string) -> string | null",
            Self::TextFrom => "text_from(url: string) -> string",
            Self::ValueFrom => "value_from(url: string, format?: string) -> any",
            Self::JmesPath => "jmes_path(data: any, query: string) -> any",
            Self::JmesPathMap => "jmes_path_map(items: list, query: string) -> list",
            Self::Subst => "subst(template: string) -> string",
            Self::ResourceSchedule => "resource_schedule(tag_value: string) -> map | null",
            Self::Image => "image(resource: map) -> map",
            Self::GetRawMetrics => "get_raw_metrics(request: map) -> list",
            Self::GetMetrics => "get_metrics(resource: map, request: map) -> list",
            Self::GetRawHealthEvents => "get_raw_health_events(filter: map) -> list",
            Self::GetHealthEvents => "get_health_events(resource: map, statuses?: list) -> list",
            Self::GetRelatedIds => "get_related_ids(resource: map) -> any",
            Self::SecurityGroup => "security_group(id: string) -> list",
            Self::Subnet => "subnet(id: string) -> list",
            Self::FlowLogs => "flow_logs(resource: map) -> list",
            Self::Vpc => "vpc(id: string) -> list",
            Self::Credentials => "credentials(resource: map) -> any",
            Self::KmsAlias => "kms_alias(resource: map) -> any",
            Self::KmsKey => "kms_key(id: string) -> list",
            Self::GetAccounts => "get_accounts(resource: map) -> any",
            Self::GetVpcs => "get_vpcs(resource: map) -> any",
            Self::GetVpces => "get_vpces(resource: map) -> any",
            Self::GetOrgids => "get_orgids(resource: map) -> any",
            Self::GetEndpoints => "get_endpoints(resource: map) -> any",
            Self::GetProtocols => "get_protocols(resource: map) -> any",
            Self::GetKeyPolicy => "get_key_policy(resource: map) -> any",
            Self::GetResourcePolicy => "get_resource_policy(resource: map) -> any",
            Self::DescribeSubscriptionFilters => "describe_subscription_filters(resource: map) -> list",
            Self::DescribeDbSnapshotAttributes => "describe_db_snapshot_attributes(resource: map) -> map",
            Self::AllImages => "all_images() -> list",
            Self::AllSnapshots => "all_snapshots() -> list",
            Self::AllLaunchConfigurationNames => "all_launch_configuration_names() -> list",
            Self::AllServiceRoles => "all_service_roles() -> list",
            Self::AllInstanceProfiles => "all_instance_profiles() -> list",
            Self::AllDbsubenetGroups => "all_dbsubenet_groups() -> list",
            Self::AllScanGroups => "all_scan_groups() -> list",
            Self::GetAccessLog => "get_access_log(resource: map) -> map",
            Self::GetLoadBalancer => "get_load_balancer(resource: map) -> map",
            Self::ShieldProtection => "shield_protection(resource: map) -> list",
            Self::ShieldSubscription => "shield_subscription(resource: map) -> any",
            Self::WebAcls => "web_acls(resource: map) -> map",
        }
    }

    /// Minimum and maximum argument counts, receiver included
    #[must_use]
    pub const fn arity(self) -> (usize, usize) {
        match self {
            Self::AllImages
            | Self::AllSnapshots
            | Self::AllLaunchConfigurationNames
            | Self::AllServiceRoles
            | Self::AllInstanceProfiles
            | Self::AllDbsubenetGroups
            | Self::AllScanGroups => (0, 0),

            Self::Glob
            | Self::Difference
            | Self::Intersect
            | Self::CidrContains
            | Self::Key
            | Self::MarkedKey
            | Self::ArnSplit
            | Self::JmesPath
            | Self::JmesPathMap
            | Self::GetMetrics => (2, 2),

            Self::ValueFrom | Self::GetHealthEvents => (1, 2),

            _ => (1, 1),
        }
    }

    /// True for functions that need an active filter
    #[must_use]
    pub const fn uses_filter(self) -> bool {
        !matches!(
            self,
            Self::Glob
                | Self::Difference
                | Self::Intersect
                | Self::Normalize
                | Self::ParseCidr
                | Self::SizeParseCidr
                | Self::CidrContains
                | Self::CidrSize
                | Self::UniqueSize
                | Self::Version
                | Self::Present
                | Self::Absent
                | Self::Key
                | Self::MarkedKey
                | Self::ArnSplit
                | Self::TextFrom
                | Self::ValueFrom
                | Self::JmesPath
                | Self::JmesPathMap
        )
    }

    /// Run the function over already-evaluated arguments, receiver first
    ///
    /// # Errors
    ///
    /// Returns an error for a wrong argument count or type, and otherwise whatever the
    /// function itself reports.
    pub fn call(self, args: &[Value]) -> Result<Value> {
        let call = CallArgs::new(self, args)?;

        Ok(match self {
            Self::Glob => Value::Bool(glob(call.string(0)?, call.string(1)?)),
            Self::Difference => Value::Bool(difference(call.list(0)?, call.list(1)?)),
            Self::Intersect => Value::Bool(intersect(call.list(0)?, call.list(1)?)),
            Self::Normalize => string_value(&normalize(call.string(0)?)),
            Self::ParseCidr => call
                .optional_string(0)?
                .and_then(parse_cidr)
                .map_or(Value::Null, |cidr| string_value(&cidr.to_string())),
            Self::SizeParseCidr | Self::CidrSize => call
                .optional_string(0)?
                .and_then(size_parse_cidr)
                .map_or(Value::Null, |prefix_len| Value::Int(i64::from(prefix_len))),
            Self::CidrContains => {
                let container = call.optional_string(0)?.and_then(parse_cidr);
                let candidate = call.optional_string(1)?.and_then(parse_cidr);
                Value::Bool(cidr_contains(container.as_ref(), candidate.as_ref()))
            }
            Self::UniqueSize => Value::Int(i64::try_from(unique_size(call.list(0)?)).unwrap_or(i64::MAX)),
            Self::Version => string_value(&Version::parse(call.string(0)?).sort_key()),
            Self::Present => Value::Bool(present(call.value(0)?)),
            Self::Absent => Value::Bool(absent(call.value(0)?)),
            Self::Key => match call.value(0)? {
                Value::Null => Value::Null,
                _ => key(call.list(0)?, call.string(1)?),
            },
            Self::MarkedKey => match call.value(0)? {
                Value::Null => Value::Null,
                _ => marked_key(call.list(0)?, call.string(1)?),
            },
            Self::ArnSplit => arn_split(call.string(0)?, call.string(1)?)?.map_or(Value::Null, |field| string_value(&field)),

            Self::TextFrom => string_value(&text_from(call.string(0)?)?),
            Self::ValueFrom => to_value(&value_from(call.string(0)?, call.optional_string(1)?)?),
            Self::JmesPath => to_value(&jmes_path(&call.native(0)?, call.string(1)?)?),
            Self::JmesPathMap => {
                let items = call.list(0)?.iter().map(to_native).collect::<Result<Vec<_>>>()?;
                let results = jmes_path_map(&items, call.string(1)?)?;
                Value::List(Arc::new(results.iter().map(to_value).collect()))
            }

            Self::Subst => adapters::subst(call.string(0)?)?,
            Self::ResourceSchedule => adapters::resource_schedule(call.value(0)?)?,
            Self::Image => adapters::image(call.value(0)?)?,
            Self::GetRawMetrics => adapters::get_raw_metrics(call.value(0)?)?,
            Self::GetMetrics => adapters::get_metrics(call.value(0)?, call.value(1)?)?,
            Self::GetRawHealthEvents => adapters::get_raw_health_events(call.value(0)?)?,
            Self::GetHealthEvents => adapters::get_health_events(call.value(0)?, call.optional(1))?,
            Self::GetRelatedIds => adapters::get_related_ids(call.value(0)?)?,
            Self::SecurityGroup => adapters::security_group(call.value(0)?)?,
            Self::Subnet => adapters::subnet(call.value(0)?)?,
            Self::FlowLogs => adapters::flow_logs(call.value(0)?)?,
            Self::Vpc => adapters::vpc(call.value(0)?)?,
            Self::Credentials => adapters::credentials(call.value(0)?)?,
            Self::KmsAlias => adapters::kms_alias(call.value(0)?)?,
            Self::KmsKey => adapters::kms_key(call.value(0)?)?,
            Self::GetAccounts => adapters::get_accounts(call.value(0)?)?,
            Self::GetVpcs => adapters::get_vpcs(call.value(0)?)?,
            Self::GetVpces => adapters::get_vpces(call.value(0)?)?,
            Self::GetOrgids => adapters::get_orgids(call.value(0)?)?,
            Self::GetEndpoints => adapters::get_endpoints(call.value(0)?)?,
            Self::GetProtocols => adapters::get_protocols(call.value(0)?)?,
            Self::GetKeyPolicy => adapters::get_key_policy(call.value(0)?)?,
            Self::GetResourcePolicy => adapters::get_resource_policy(call.value(0)?)?,
            Self::DescribeSubscriptionFilters => adapters::describe_subscription_filters(call.value(0)?)?,
            Self::DescribeDbSnapshotAttributes => adapters::describe_db_snapshot_attributes(call.value(0)?)?,
            Self::AllImages => adapters::all_images()?,
            Self::AllSnapshots => adapters::all_snapshots()?,
            Self::AllLaunchConfigurationNames => adapters::all_launch_configuration_names()?,
            Self::AllServiceRoles => adapters::all_service_roles()?,
            Self::AllInstanceProfiles => adapters::all_instance_profiles()?,
            Self::AllDbsubenetGroups => adapters::all_dbsubenet_groups()?,
            Self::AllScanGroups => adapters::all_scan_groups()?,
            Self::GetAccessLog => adapters::get_access_log(call.value(0)?)?,
            Self::GetLoadBalancer => adapters::get_load_balancer(call.value(0)?)?,
            Self::ShieldProtection => adapters::shield_protection(call.value(0)?)?,
            Self::ShieldSubscription => adapters::shield_subscription(call.value(0)?)?,
            Self::WebAcls => adapters::web_acls(call.value(0)?)?,
        })
    }
}

/// Bind every extension function into an evaluation context
pub fn register(context: &mut Context<'_>) {
    for function in ExtensionFunction::iter() {
        context.add_function(function.name(), invoke);
    }
}

/// The evaluator-facing handler shared by every extension function
///
/// # Errors
///
/// Returns the function's error, prefixed by the evaluator with the function name.
pub fn invoke(ftx: &FunctionContext, Arguments(args): Arguments) -> Result<Value, ExecutionError> {
    let function = ExtensionFunction::from_str(&ftx.name).map_err(|e| ftx.error(format!("not a registered extension function: {e}")))?;

    let mut all = Vec::with_capacity(args.len() + 1);
    if let Some(this) = &ftx.this {
        all.push(this.clone());
    }
    all.extend(args.iter().cloned());

    function.call(&all).map_err(|e| ftx.error(e))
}
