//! Command line interface.
//!
//! Argument parsing, command dispatch and colored user feedback for the
//! release, validate and preview commands.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, PlanArgs, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
