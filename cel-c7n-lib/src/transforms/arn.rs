use crate::Result;
use core::str::FromStr;
use ohno::{app_err, bail};
use strum::{Display, EnumString};

/// The fields of an ARN that a policy can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ArnField {
    Partition,
    Service,
    Region,
    AccountId,
    ResourceType,
    ResourceId,
}

/// A decomposed ARN
///
/// Three shapes are recognized:
///
/// - `arn:partition:service:region:account-id:resource-id`
/// - `arn:partition:service:region:account-id:resource-type/resource-id`
/// - `arn:partition:service:region:account-id:resource-type:resource-id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource_type: Option<String>,
    pub resource_id: String,
}

impl Arn {
    /// Split an ARN on `:` and sort out the five- and six-field shapes
    ///
    /// # Errors
    ///
    /// Returns an error when the text does not start with `arn` or has neither six nor
    /// seven `:`-separated parts.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split(':');
        if parts.next() != Some("arn") {
            bail!("not an ARN: {text}");
        }

        let fields: Vec<&str> = parts.collect();
        match fields.as_slice() {
            [partition, service, region, account_id, resource] => {
                let (resource_type, resource_id) = match resource.split_once('/') {
                    Some((kind, id)) => (Some((*kind).to_string()), id.to_string()),
                    None => (None, (*resource).to_string()),
                };
                Ok(Self {
                    partition: (*partition).to_string(),
                    service: (*service).to_string(),
                    region: (*region).to_string(),
                    account_id: (*account_id).to_string(),
                    resource_type,
                    resource_id,
                })
            }
            [partition, service, region, account_id, resource_type, resource_id] => Ok(Self {
                partition: (*partition).to_string(),
                service: (*service).to_string(),
                region: (*region).to_string(),
                account_id: (*account_id).to_string(),
                resource_type: Some((*resource_type).to_string()),
                resource_id: (*resource_id).to_string(),
            }),
            _ => bail!("not an ARN: {text} has {} fields after the 'arn' prefix, expected 5 or 6", fields.len()),
        }
    }

    /// Look up one field; only `resource-type` can be absent
    #[must_use]
    pub fn field(&self, field: ArnField) -> Option<&str> {
        match field {
            ArnField::Partition => Some(&self.partition),
            ArnField::Service => Some(&self.service),
            ArnField::Region => Some(&self.region),
            ArnField::AccountId => Some(&self.account_id),
            ArnField::ResourceType => self.resource_type.as_deref(),
            ArnField::ResourceId => Some(&self.resource_id),
        }
    }
}

/// Extract one named field from an ARN string
///
/// # Errors
///
/// Returns an error for text that is not an ARN or for an unknown field name.
pub fn arn_split(arn: &str, field: &str) -> Result<Option<String>> {
    let field = ArnField::from_str(field).map_err(|e| {
        app_err!("unknown ARN field '{field}' ({e}); expected one of partition, service, region, account-id, resource-type, resource-id")
    })?;
    let arn = Arn::parse(arn)?;
    Ok(arn.field(field).map(ToString::to_string))
}
