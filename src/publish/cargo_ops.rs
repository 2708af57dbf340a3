//! Cargo-side commands of a package release.

use crate::error::{CommandError, PlanError, Result};
use crate::plan::CommandSet;
use crate::process::{CommandRunner, display_command, run_checked, split_command_line};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the release command ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The release command succeeded
    Released,
    /// The release command failed because the version already exists
    AlreadyPublished {
        /// Captured stderr that matched the tolerance marker
        stderr: String,
    },
}

/// Runs the configured cargo commands for one package at a time
#[derive(Debug)]
pub struct CargoPublisher<'a, R> {
    runner: &'a R,
    commands: &'a CommandSet,
}

impl<'a, R: CommandRunner> CargoPublisher<'a, R> {
    /// Create a publisher over `commands`
    pub fn new(runner: &'a R, commands: &'a CommandSet) -> Self {
        Self { runner, commands }
    }

    /// Refresh `Cargo.lock` after a version edit (run at the workspace root)
    pub async fn refresh_lockfile(&self, workspace_root: &Path) -> Result<()> {
        let (program, args) = configured(&self.commands.lockfile_refresh, "commands.lockfile_refresh")?;
        run_checked(self.runner, program, args, workspace_root)
            .await
            .map(drop)
    }

    /// Release the package in `package_dir`.
    ///
    /// A failing command whose stderr contains the tolerance marker yields
    /// [`PublishOutcome::AlreadyPublished`]; any other failure is an error.
    pub async fn release(&self, package_dir: &Path) -> Result<PublishOutcome> {
        let (program, args) = configured(&self.commands.release, "commands.release")?;
        let output = self.runner.execute(program, args, package_dir).await?;

        if output.stderr.contains(&self.commands.tolerate_stderr) {
            if !output.success() {
                log::warn!(
                    "Ignoring release failure in {}: stderr mentions '{}'",
                    package_dir.display(),
                    self.commands.tolerate_stderr
                );
                return Ok(PublishOutcome::AlreadyPublished {
                    stderr: output.stderr,
                });
            }
            return Ok(PublishOutcome::Released);
        }

        if output.success() {
            Ok(PublishOutcome::Released)
        } else {
            Err(CommandError::Failed {
                command: display_command(program, args),
                code: output.status,
                stderr: output.stderr,
            }
            .into())
        }
    }
}

fn configured<'c>(line: &'c [String], field: &str) -> Result<(&'c str, &'c [String])> {
    split_command_line(line).ok_or_else(|| {
        PlanError::EmptySetting {
            field: field.to_string(),
        }
        .into()
    })
}
