//! Ordered, dependency-aware patch release across the plan.
//!
//! For each plan entry, strictly in order: load the manifest, bump the patch
//! version, rewrite workspace dependency pins, save, refresh the lockfile,
//! stage, commit, and run the release command. After the last entry the
//! repository is pushed. The first fatal error stops the run and names the
//! failing entry; nothing is rolled back.

use crate::cli::RuntimeConfig;
use crate::error::{PlanError, Result};
use crate::git::{GitOperations, PushInfo};
use crate::plan::{PlannedPackage, ReleasePlan};
use crate::process::CommandRunner;
use crate::publish::CargoPublisher;
use crate::release::{PackageReport, PushStatus, ReleaseReport};
use crate::version::{ManifestEditor, SemanticVersion};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Knobs for a propagation run
#[derive(Debug, Clone)]
pub struct PropagatorOptions {
    /// Compute and report everything but leave manifests untouched
    pub dry_run: bool,
    /// Push once every package is done
    pub push: bool,
    /// Resume at this plan directory; earlier entries are treated as released
    pub start_at: Option<String>,
}

impl Default for PropagatorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            push: true,
            start_at: None,
        }
    }
}

/// Drives a release plan through a [`CommandRunner`]
pub struct Propagator<'a, R> {
    plan: &'a ReleasePlan,
    workspace_root: PathBuf,
    runner: &'a R,
    config: &'a RuntimeConfig,
    options: PropagatorOptions,
}

impl<'a, R: CommandRunner> Propagator<'a, R> {
    /// Create a propagator with default options
    pub fn new<P: AsRef<Path>>(
        plan: &'a ReleasePlan,
        workspace_root: P,
        runner: &'a R,
        config: &'a RuntimeConfig,
    ) -> Self {
        Self {
            plan,
            workspace_root: workspace_root.as_ref().to_path_buf(),
            runner,
            config,
            options: PropagatorOptions::default(),
        }
    }

    /// Replace the run options
    pub fn with_options(mut self, options: PropagatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Process every plan entry in order, then push.
    ///
    /// # Errors
    /// The first failing entry aborts the run with
    /// [`ReleaseError::RunFailure`](crate::error::ReleaseError::RunFailure).
    /// Entries before it stay bumped, committed and released.
    pub async fn run(&self) -> Result<ReleaseReport> {
        let start = self.start_index()?;
        let mut report = ReleaseReport::new(self.options.dry_run);
        let mut released = self.seed_released(start, &mut report)?;

        for (index, package) in self.plan.packages().iter().enumerate().skip(start) {
            let package_report = self
                .release_package(package, &released)
                .await
                .map_err(|e| e.at_package(index, &package.directory))?;

            released.insert(package_report.name.clone(), package_report.new_version);
            report.packages.push(package_report);
        }

        if self.options.push {
            self.config.println("Pushing");
            let git = GitOperations::new(self.runner, self.plan.git(), &self.workspace_root);
            report.push = match git.push().await {
                PushInfo::Pushed => PushStatus::Pushed,
                PushInfo::Failed { reason } => {
                    self.config.warning_println(&format!("Push failed (ignored): {}", reason));
                    PushStatus::Failed { reason }
                }
            };
        }

        Ok(report)
    }

    fn start_index(&self) -> Result<usize> {
        match self.options.start_at.as_deref() {
            None => Ok(0),
            Some(directory) => self.plan.position_of(directory).ok_or_else(|| {
                PlanError::UnknownDirectory {
                    directory: directory.to_string(),
                }
                .into()
            }),
        }
    }

    /// Entries before `start` were released by an earlier run; their current
    /// manifest versions are what dependents must pin.
    fn seed_released(
        &self,
        start: usize,
        report: &mut ReleaseReport,
    ) -> Result<HashMap<String, SemanticVersion>> {
        let mut released = HashMap::new();

        for (index, package) in self.plan.packages().iter().enumerate().take(start) {
            let seeded = self
                .current_version(package)
                .map_err(|e| e.at_package(index, &package.directory))?;
            log::info!(
                "Skipping {} ({} already at {})",
                package.directory,
                seeded.0,
                seeded.1
            );
            released.insert(seeded.0, seeded.1);
            report.skipped.push(package.directory.clone());
        }

        Ok(released)
    }

    fn current_version(&self, package: &PlannedPackage) -> Result<(String, SemanticVersion)> {
        let editor = ManifestEditor::open(self.plan.manifest_path(&self.workspace_root, package))?;
        let version = SemanticVersion::parse(editor.package_version()?)?;
        Ok((editor.package_name()?.to_string(), version))
    }

    async fn release_package(
        &self,
        package: &PlannedPackage,
        released: &HashMap<String, SemanticVersion>,
    ) -> Result<PackageReport> {
        let manifest = self.plan.manifest_path(&self.workspace_root, package);
        let mut editor = ManifestEditor::open(&manifest)?;

        let name = editor.package_name()?.to_string();
        if name != package.name {
            log::warn!(
                "Plan lists '{}' as '{}' but its manifest names '{}'",
                package.directory,
                package.name,
                name
            );
        }

        let current = SemanticVersion::parse(editor.package_version()?)?;
        let next = current.increment_patch()?;

        self.config.println(&format!(
            "Current version of: {} is {}, updating to {}",
            name, current, next
        ));

        editor.set_package_version(&next)?;
        let pins = editor.update_dependency_pins(|dependency| {
            if !self.plan.is_known(dependency) {
                return None;
            }
            match released.get(dependency) {
                Some(version) => Some(*version),
                None => {
                    log::debug!(
                        "'{}' has not been released in this run; pinning it at {} alongside '{}'",
                        dependency,
                        next,
                        name
                    );
                    Some(next)
                }
            }
        });

        for pin in &pins {
            self.config.verbose_println(&format!(
                "  {} {} → {}",
                pin.kind.table_name(),
                pin.dependency,
                pin.pinned
            ));
        }

        if self.options.dry_run {
            log::info!("[dry-run] not writing {}", manifest.display());
        } else {
            editor.save()?;
        }

        let publisher = CargoPublisher::new(self.runner, self.plan.commands());
        publisher.refresh_lockfile(&self.workspace_root).await?;

        let git = GitOperations::new(self.runner, self.plan.git(), &self.workspace_root);
        git.stage_all().await?;
        let commit_message = git.commit_bump(&package.directory, &next).await?;

        let package_dir = self.plan.package_dir(&self.workspace_root, package);
        let publish = publisher.release(&package_dir).await?;

        Ok(PackageReport {
            directory: package.directory.clone(),
            name,
            manifest,
            previous_version: current,
            new_version: next,
            pins,
            commit_message,
            publish,
        })
    }
}
