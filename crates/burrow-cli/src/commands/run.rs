//! `burrow run` — provision a root filesystem and run a command inside it.

use anyhow::Context;
use burrow_common::config::BurrowConfig;
use burrow_common::types::{InstanceId, ProcessSpec};
use clap::Args;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command to run inside the sandbox, followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Executes the `run` command, returning the workload's exit code.
///
/// # Errors
///
/// Returns an error if identifier generation, provisioning, or the re-exec fails.
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let workload = ProcessSpec::from_argv(&args.command)?;
    let id = InstanceId::generate().context("failed to generate instance identifier")?;
    let config = BurrowConfig::default();
    tracing::info!(id = %id, source = %config.source_url, "starting instance");

    let code = burrow_runtime::launcher::launch(&config, &id, &workload)
        .with_context(|| format!("instance {id} failed"))?;
    Ok(code)
}
