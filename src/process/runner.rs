//! Command runners.

use crate::error::{CommandError, Result};
use std::future::Future;
use std::path::Path;
use std::process::Stdio;

/// Exit status and captured streams of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with empty streams
    pub fn succeeded() -> Self {
        Self {
            status: Some(0),
            ..Self::default()
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Trait defining how external commands are executed
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd` and wait for it to finish.
    ///
    /// A non-zero exit is not an error at this level; callers decide.
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> impl Future<Output = Result<CommandOutput>>;
}

/// Runs commands on the host through `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    echo: bool,
}

impl SystemRunner {
    /// Create a runner; with `echo` the captured streams are replayed to the terminal
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl CommandRunner for SystemRunner {
    async fn execute(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        let command = super::display_command(program, args);
        let resolved = which::which(program).map_err(|e| CommandError::NotFound {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

        log::info!("Running `{}` in {}", command, cwd.display());

        let output = tokio::process::Command::new(&resolved)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if self.echo {
            if !stdout.is_empty() {
                print!("{stdout}");
            }
            if !stderr.is_empty() {
                eprint!("{stderr}");
            }
        }
        log::debug!("`{}` exited with {:?}", command, output.status.code());

        Ok(CommandOutput {
            status: output.status.code(),
            stdout,
            stderr,
        })
    }
}

/// Logs commands instead of running them
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    async fn execute(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        log::info!(
            "[dry-run] would run `{}` in {}",
            super::display_command(program, args),
            cwd.display()
        );
        Ok(CommandOutput::succeeded())
    }
}

/// Check that every program is on PATH before a run touches anything
pub fn ensure_available<'a>(programs: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for program in programs {
        let path = which::which(program).map_err(|e| CommandError::NotFound {
            program: program.to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("Using {} for '{}'", path.display(), program);
    }
    Ok(())
}
