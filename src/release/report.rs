//! Per-run release report.

use crate::publish::PublishOutcome;
use crate::version::{PinUpdate, SemanticVersion};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    /// Plan directory
    pub directory: String,
    /// Package name from the manifest
    pub name: String,
    /// Manifest that was rewritten
    pub manifest: PathBuf,
    /// Version before the bump
    pub previous_version: SemanticVersion,
    /// Version after the bump
    pub new_version: SemanticVersion,
    /// Dependency pins rewritten in this manifest
    pub pins: Vec<PinUpdate>,
    /// Commit message used
    pub commit_message: String,
    /// Release command outcome
    pub publish: PublishOutcome,
}

/// Final push status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushStatus {
    /// Push disabled for this run
    Skipped,
    /// Push succeeded
    Pushed,
    /// Push failed and was ignored
    Failed {
        /// Failure description
        reason: String,
    },
}

/// Result of a full propagation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseReport {
    /// Whether manifests were left untouched
    pub dry_run: bool,
    /// Directories skipped because of `--start-at`
    pub skipped: Vec<String>,
    /// Processed packages, in plan order
    pub packages: Vec<PackageReport>,
    /// Final push
    pub push: PushStatus,
}

impl ReleaseReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            skipped: Vec::new(),
            packages: Vec::new(),
            push: PushStatus::Skipped,
        }
    }

    /// Number of packages whose release was tolerated as already published
    pub fn already_published(&self) -> usize {
        self.packages
            .iter()
            .filter(|p| matches!(p.publish, PublishOutcome::AlreadyPublished { .. }))
            .count()
    }

    /// Report for a package name
    pub fn package(&self, name: &str) -> Option<&PackageReport> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Multi-line human readable summary
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        for package in &self.packages {
            summary.push_str(&format!(
                "{} ({}): {} → {}",
                package.name, package.directory, package.previous_version, package.new_version
            ));
            if !package.pins.is_empty() {
                summary.push_str(&format!(", {} pin(s) updated", package.pins.len()));
            }
            if let PublishOutcome::AlreadyPublished { .. } = package.publish {
                summary.push_str(", already published");
            }
            summary.push('\n');
        }
        summary
    }
}
