//! Git operations needed by the release loop.
//!
//! Staging, committing and pushing are plain `git` invocations routed
//! through a [`CommandRunner`], so they follow the same dry-run and test
//! paths as every other external command.

use crate::error::Result;
use crate::plan::GitSettings;
use crate::process::{CommandOutput, CommandRunner, run_checked};
use crate::version::SemanticVersion;
use std::path::{Path, PathBuf};

/// Git commands bound to a repository root
#[derive(Debug)]
pub struct GitOperations<'a, R> {
    runner: &'a R,
    settings: &'a GitSettings,
    repo_root: PathBuf,
}

/// Outcome of the final push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushInfo {
    /// Push completed
    Pushed,
    /// Push failed; the release is not affected
    Failed {
        /// Failure description
        reason: String,
    },
}

impl<'a, R: CommandRunner> GitOperations<'a, R> {
    /// Bind git operations to `repo_root`
    pub fn new<P: AsRef<Path>>(runner: &'a R, settings: &'a GitSettings, repo_root: P) -> Self {
        Self {
            runner,
            settings,
            repo_root: repo_root.as_ref().to_path_buf(),
        }
    }

    /// `git add --all`
    pub async fn stage_all(&self) -> Result<()> {
        self.git(&["add", "--all"]).await.map(drop)
    }

    /// Commit staged changes for a bumped package, returning the message used
    pub async fn commit_bump(&self, directory: &str, version: &SemanticVersion) -> Result<String> {
        let message = self.settings.commit_message(directory, version);
        self.git(&["commit", "-m", message.as_str()]).await?;
        Ok(message)
    }

    /// Push to the configured remote. Never fails the caller.
    pub async fn push(&self) -> PushInfo {
        let mut args = vec!["push"];
        if let Some(remote) = self.settings.remote.as_deref() {
            args.push(remote);
        }

        match self.git(&args).await {
            Ok(_) => PushInfo::Pushed,
            Err(e) => {
                log::warn!("git push failed: {}", e);
                PushInfo::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        run_checked(self.runner, "git", &args, &self.repo_root).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    #[tokio::test]
    async fn commit_uses_rendered_message() {
        let runner = ScriptedRunner::default();
        let settings = GitSettings::default();
        let git = GitOperations::new(&runner, &settings, "/repo");

        git.stage_all().await.unwrap();
        let message = git
            .commit_bump("libfsntfs", &SemanticVersion::new(0, 3, 2))
            .await
            .unwrap();

        assert_eq!(message, "bump libfsntfs version to 0.3.2");
        let calls = runner.calls();
        assert_eq!(calls[0].0, "git add --all");
        assert_eq!(calls[1].0, "git commit -m \"bump libfsntfs version to 0.3.2\"");
        assert_eq!(calls[1].1, PathBuf::from("/repo"));
    }

    #[tokio::test]
    async fn failed_commit_is_an_error() {
        let runner = ScriptedRunner::default()
            .respond("git commit", CommandOutput::failed(1, "nothing to commit"));
        let settings = GitSettings::default();
        let git = GitOperations::new(&runner, &settings, "/repo");

        let err = git
            .commit_bump("common", &SemanticVersion::new(0, 1, 1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nothing to commit"));
    }

    #[tokio::test]
    async fn push_failure_is_swallowed() {
        let runner = ScriptedRunner::default()
            .respond("git push", CommandOutput::failed(128, "could not read Username"));
        let settings = GitSettings {
            remote: Some("origin".to_string()),
            ..GitSettings::default()
        };
        let git = GitOperations::new(&runner, &settings, "/repo");

        let info = git.push().await;
        assert!(matches!(info, PushInfo::Failed { ref reason } if reason.contains("Username")));
        assert_eq!(runner.calls()[0].0, "git push origin");
    }
}
