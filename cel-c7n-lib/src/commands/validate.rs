use super::Host;
use super::config::PolicyFile;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Policy file to check
    #[arg(long, short = 'p', value_name = "PATH")]
    pub policy: Utf8PathBuf,
}

/// Validates a policy file by loading it and compiling every expression
///
/// # Errors
///
/// Returns an error if the policy file cannot be loaded, parsed, or compiled
pub fn validate_policy<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    match PolicyFile::load(&args.policy) {
        Ok(policy) => {
            let _ = writeln!(host.output(), "Policy file is valid");
            let _ = writeln!(host.output(), "Policy file: {}", args.policy);
            for expression in &policy.expressions {
                let _ = writeln!(host.output(), "  {}: {}", expression.name(), expression.summary());
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Policy validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
