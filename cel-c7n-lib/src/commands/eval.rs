use super::Host;
use super::config::PolicyFile;
use crate::Result;
use crate::bridge::to_native;
use crate::expr::{Activation, evaluate};
use crate::filter::{Filter, RecordedFilter};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use ohno::IntoAppError;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "      eval";

#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Policy file declaring the expressions to evaluate
    #[arg(long, short = 'p', value_name = "PATH")]
    pub policy: Utf8PathBuf,

    /// JSON resource document, or an array of them
    #[arg(long, short = 'r', value_name = "PATH")]
    pub resource: Utf8PathBuf,

    /// Recorded filter data answering capability functions
    #[arg(long, short = 'f', value_name = "PATH")]
    pub filter: Option<Utf8PathBuf>,

    /// JSON event document bound as `Event`
    #[arg(long, value_name = "PATH")]
    pub event: Option<Utf8PathBuf>,

    /// Evaluation time as RFC 3339 (default is the current time)
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<String>,
}

/// Evaluates every expression of a policy against one or more resources and prints the results
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or an expression fails to evaluate
pub fn eval_policy<H: Host>(host: &mut H, args: &EvalArgs) -> Result<()> {
    match eval_policy_inner(host, args) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Evaluation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

fn eval_policy_inner<H: Host>(host: &mut H, args: &EvalArgs) -> Result<()> {
    let policy = PolicyFile::load(&args.policy)?;

    let filter: Arc<dyn Filter> = match &args.filter {
        Some(path) => Arc::new(RecordedFilter::load(path)?),
        None => Arc::new(RecordedFilter::default()),
    };

    let now = parse_now(args.now.as_deref())?;
    let event = args.event.as_deref().map(read_json).transpose()?;

    let resources = match read_json(&args.resource)? {
        JsonValue::Array(resources) => resources,
        resource => vec![resource],
    };

    let resource_type = &filter.model().resource_type;
    let multiple = resources.len() > 1;
    for (index, resource) in resources.into_iter().enumerate() {
        if multiple {
            let _ = writeln!(host.output(), "[{index}]");
        }

        let mut activation = Activation::new(resource, now);
        activation.event.clone_from(&event);

        for expression in &policy.expressions {
            if let Some(wanted) = policy.resource_for(expression)
                && !resource_type.is_empty()
                && wanted != resource_type
            {
                log::debug!(target: LOG_TARGET, "Skipping '{}': written for '{wanted}', filter is for '{resource_type}'", expression.name());
                continue;
            }

            let value = evaluate(expression, &activation, Arc::clone(&filter))?;
            let native = to_native(&value)?;
            let _ = writeln!(host.output(), "{}: {native}", expression.name());
        }
    }

    Ok(())
}

fn parse_now(text: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match text {
        Some(text) => DateTime::parse_from_rfc3339(text).into_app_err_with(|| format!("invalid --now timestamp '{text}'")),
        None => Ok(Utc::now().fixed_offset()),
    }
}

fn read_json(path: &Utf8Path) -> Result<JsonValue> {
    let text = fs::read_to_string(path).into_app_err_with(|| format!("reading '{path}'"))?;
    serde_json::from_str(&text).into_app_err_with(|| format!("parsing JSON file '{path}'"))
}
