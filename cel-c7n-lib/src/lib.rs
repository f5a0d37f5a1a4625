#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Cloud Custodian extension functions for CEL policy expressions
//!
//! This library plugs cloud-compliance capabilities into a CEL evaluator. A policy
//! expression such as
//!
//! ```text
//! Resource.Tags.key("Owner") == null && Resource.get_metrics({...}).exists(m, m < 5.0)
//! ```
//!
//! is compiled once and evaluated per resource. The functions it calls are ordinary
//! CEL functions, but many of them reach into the active [`filter::Filter`] for cached
//! cloud data.
//!
//! # Module Organization
//!
//! - [`bridge`]: Conversion between native JSON documents and CEL values
//! - [`transforms`]: Pure functions (CIDR, versions, ARNs, tags, schedules, sets)
//! - [`remote`]: Fetching and parsing reference documents from URLs
//! - [`filter`]: The filter capability surface and the ambient evaluation slot
//! - [`adapters`]: Functions that project filter capabilities into CEL
//! - [`registry`]: The fixed table of extension functions bound by name
//! - [`expr`]: Policy expressions and the evaluation entry point
//! - [`commands`]: Command-line interface

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod adapters;
pub mod bridge;
pub mod commands;
pub mod expr;
pub mod filter;
pub mod registry;
pub mod remote;
pub mod transforms;

pub use crate::commands::{Host, run};
