//! `burrow hey` — internal verb run by the re-executed process.

use anyhow::Context;
use burrow_common::types::ProcessSpec;
use clap::Args;

/// Arguments for the internal verb.
#[derive(Args, Debug)]
pub struct ChildArgs {
    /// Workload command and its arguments, forwarded unmodified by `run`.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Confines this process and runs the workload, returning its exit code.
///
/// # Errors
///
/// Returns an error if no instance context was passed down, or if
/// confinement or the workload spawn fails.
pub fn execute(args: ChildArgs) -> anyhow::Result<i32> {
    let workload = ProcessSpec::from_argv(&args.command)?;
    let context = burrow_runtime::entry::context_from_env()?;
    let code = burrow_runtime::entry::enter(&context, &workload)
        .with_context(|| format!("confinement of instance {} failed", context.id))?;
    Ok(code)
}
