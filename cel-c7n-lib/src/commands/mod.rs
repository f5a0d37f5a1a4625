//! Command-line interface for cel-c7n
//!
//! Three commands sit on top of the library:
//!
//! - **eval**: load a policy file, evaluate each expression against one or more JSON
//!   resource documents, and print the bridged results. Capability functions are answered
//!   by a [`crate::filter::RecordedFilter`] loaded from `--filter`.
//! - **validate**: load and compile a policy file without evaluating it
//! - **functions**: list the registered extension functions with their signatures
//!
//! Policy files are TOML with an `[[expressions]]` list; see [`PolicyFile`].

mod common;
mod config;
mod eval;
mod functions;
mod host;
mod run;
mod validate;

pub use config::PolicyFile;
pub use eval::{EvalArgs, eval_policy};
pub use functions::{FunctionsArgs, list_functions};
pub use host::Host;
pub use run::run;
pub use validate::{ValidateArgs, validate_policy};
