use super::Host;
use crate::Result;
use crate::registry::ExtensionFunction;
use clap::Parser;
use std::io::Write;
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
pub struct FunctionsArgs {
    /// Only list functions that need filter data
    #[arg(long)]
    pub capabilities: bool,
}

/// Lists the extension functions available to policy expressions
///
/// # Errors
///
/// Never fails; the signature matches the other commands
pub fn list_functions<H: Host>(host: &mut H, args: &FunctionsArgs) -> Result<()> {
    let mut out = host.output();
    for function in ExtensionFunction::iter().filter(|f| !args.capabilities || f.uses_filter()) {
        let _ = writeln!(out, "{}", function.signature());
    }
    Ok(())
}
