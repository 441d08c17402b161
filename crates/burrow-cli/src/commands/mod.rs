//! CLI command definitions and dispatch.

pub mod child;
pub mod run;

use clap::{Parser, Subcommand};

/// Burrow — run a command in a throwaway namespaced chroot.
#[derive(Parser, Debug)]
#[command(name = "burrow", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision a root filesystem and run a command confined inside it.
    Run(run::RunArgs),
    /// Internal: confine the re-executed process and run the workload.
    #[command(name = "hey", alias = "child", hide = true)]
    Hey(child::ChildArgs),
}

/// Dispatches the parsed CLI command to its handler and returns the exit code.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Run(args) => run::execute(args),
        Command::Hey(args) => child::execute(args),
    }
}
