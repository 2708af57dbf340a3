//! Process-execution boundary.
//!
//! Every external tool (cargo, git) is reached through [`CommandRunner`] so
//! the release loop can be driven by a scripted runner in tests or by
//! [`DryRunRunner`] when nothing should happen.

mod runner;

pub use runner::{CommandOutput, CommandRunner, DryRunRunner, SystemRunner, ensure_available};

use crate::error::{CommandError, Result};
use std::path::Path;

/// Render a command line for messages
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|part| {
            if part.is_empty() || part.contains(char::is_whitespace) {
                format!("\"{}\"", part)
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command and turn a non-zero exit into [`CommandError::Failed`]
pub async fn run_checked<R: CommandRunner>(
    runner: &R,
    program: &str,
    args: &[String],
    cwd: &Path,
) -> Result<CommandOutput> {
    let output = runner.execute(program, args, cwd).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(CommandError::Failed {
            command: display_command(program, args),
            code: output.status,
            stderr: output.stderr,
        }
        .into())
    }
}

/// Split a configured command line into program and arguments
pub fn split_command_line(line: &[String]) -> Option<(&str, &[String])> {
    line.split_first()
        .map(|(program, args)| (program.as_str(), args))
}
