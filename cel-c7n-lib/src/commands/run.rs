//! Command dispatch logic for cel-c7n

use super::common::CommonArgs;
use super::{EvalArgs, FunctionsArgs, ValidateArgs, eval_policy, list_functions, validate_policy};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "cel-c7n", author, version, long_about = None)]
#[command(about = "Evaluate Cloud Custodian CEL policies against resource documents")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: C7nSubcommand,
}

#[derive(Subcommand, Debug)]
enum C7nSubcommand {
    /// Evaluate a policy's expressions against resource documents
    Eval(Box<EvalArgs>),
    /// Check that a policy file loads and compiles
    Validate(ValidateArgs),
    /// List the extension functions available to expressions
    Functions(FunctionsArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    cli.common.init_logging();

    match &cli.command {
        C7nSubcommand::Eval(eval_args) => eval_policy(host, eval_args),
        C7nSubcommand::Validate(validate_args) => validate_policy(host, validate_args),
        C7nSubcommand::Functions(functions_args) => list_functions(host, functions_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    #[test]
    fn test_functions_command() {
        let mut host = TestHost::default();
        run(&mut host, ["cel-c7n", "functions", "--capabilities"]).unwrap();
        assert!(host.output_str().contains("web_acls("));
    }

    #[test]
    fn test_log_level_is_global() {
        let mut host = TestHost::default();
        run(&mut host, ["cel-c7n", "functions", "--log-level", "none"]).unwrap();
        assert!(host.output_str().contains("glob("));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
