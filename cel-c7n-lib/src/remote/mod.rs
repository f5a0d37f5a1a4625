//! Reference documents pulled in from URLs
//!
//! A policy can compare a resource against data published elsewhere, for example an
//! allow-list of account ids kept in a bucket:
//!
//! ```text
//! Resource.OwnerId in value_from("s3://policy-data/accounts.txt")
//! ```
//!
//! The pipeline is fetch ([`text_from`]), then parse ([`parse_text`]), then optionally
//! project with a `JMESPath` query ([`jmes_path`], [`jmes_path_map`]). Everything here
//! works on native JSON; conversion to CEL values happens in the registry.

mod document_format;
mod fetch;
mod parse;
mod query;

pub use document_format::DocumentFormat;
pub use fetch::{resolve_url, text_from};
pub use parse::parse_text;
pub use query::{jmes_path, jmes_path_map};

use crate::Result;
use serde_json::Value as JsonValue;

/// Fetch a document and parse it
///
/// When `format` is `None` it is taken from the suffix of the URL path. The format is
/// checked before any network access.
///
/// # Errors
///
/// Returns an error for an unsupported format, a failed fetch, or unparseable content.
pub fn value_from(url: &str, format: Option<&str>) -> Result<JsonValue> {
    let format = match format {
        Some(name) => DocumentFormat::from_name(name)?,
        None => DocumentFormat::from_url(url)?,
    };

    let text = text_from(url)?;
    parse_text(&text, format)
}
