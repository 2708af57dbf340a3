//! Release plan loading.
//!
//! The plan is the operator-supplied propagation order: which package
//! directories to bump, in which order, and which package names count as
//! workspace members for pin rewriting.

use crate::error::{PlanError, Result};
use crate::version::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default plan file name, looked up at the workspace root
pub const DEFAULT_PLAN_FILE: &str = "release-plan.toml";

/// Default manifest file name inside each package directory
pub const DEFAULT_MANIFEST_FILE: &str = "Cargo.toml";

/// One entry of the propagation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannedPackage {
    /// Package directory relative to the workspace root
    pub directory: String,
    /// Package name as declared in its manifest
    pub name: String,
}

impl PlannedPackage {
    /// Create a plan entry
    pub fn new(directory: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
        }
    }
}

/// External command lines run for each package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandSet {
    /// Run at the workspace root after a manifest is rewritten
    pub lockfile_refresh: Vec<String>,
    /// Run inside the package directory to publish it
    pub release: Vec<String>,
    /// Release stderr containing this text turns a failure into a no-op
    pub tolerate_stderr: String,
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            lockfile_refresh: vec!["cargo".to_string(), "check".to_string()],
            release: vec![
                "cargo".to_string(),
                "release".to_string(),
                "--no-dev-version".to_string(),
                "--skip-tag".to_string(),
                "--skip-push".to_string(),
            ],
            tolerate_stderr: "already".to_string(),
        }
    }
}

/// Git settings for the per-package commit and the final push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSettings {
    /// Commit message; `{directory}` and `{version}` are substituted
    pub commit_message: String,
    /// Remote for the final push; plain `git push` when unset
    pub remote: Option<String>,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            commit_message: "bump {directory} version to {version}".to_string(),
            remote: None,
        }
    }
}

impl GitSettings {
    /// Render the commit message for a bumped package
    pub fn commit_message(&self, directory: &str, version: &SemanticVersion) -> String {
        self.commit_message
            .replace("{directory}", directory)
            .replace("{version}", &version.to_string())
    }
}

/// On-disk layout of the plan file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    #[serde(default = "default_manifest_file")]
    manifest_file: String,
    #[serde(default)]
    commands: CommandSet,
    #[serde(default)]
    git: GitSettings,
    #[serde(default, rename = "package")]
    packages: Vec<PlannedPackage>,
}

fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}

/// Validated propagation order plus the derived set of known package names
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    manifest_file: String,
    commands: CommandSet,
    git: GitSettings,
    packages: Vec<PlannedPackage>,
    known_names: HashSet<String>,
}

impl ReleasePlan {
    /// Build a plan with default commands and git settings
    pub fn new(packages: Vec<PlannedPackage>) -> Result<Self> {
        Self::from_parts(
            default_manifest_file(),
            CommandSet::default(),
            GitSettings::default(),
            packages,
        )
    }

    /// Build a plan from all of its parts, rejecting inconsistent input
    pub fn from_parts(
        manifest_file: String,
        commands: CommandSet,
        git: GitSettings,
        packages: Vec<PlannedPackage>,
    ) -> Result<Self> {
        if packages.is_empty() {
            return Err(PlanError::Empty.into());
        }

        let mut directories = HashSet::new();
        let mut known_names = HashSet::new();
        for package in &packages {
            if package.directory.trim().is_empty() {
                return Err(PlanError::EmptySetting {
                    field: "package.directory".to_string(),
                }
                .into());
            }
            if package.name.trim().is_empty() {
                return Err(PlanError::EmptySetting {
                    field: "package.name".to_string(),
                }
                .into());
            }
            if !directories.insert(normalize_directory(&package.directory)) {
                return Err(PlanError::DuplicateDirectory {
                    directory: package.directory.clone(),
                }
                .into());
            }
            if !known_names.insert(package.name.clone()) {
                return Err(PlanError::DuplicatePackage {
                    name: package.name.clone(),
                }
                .into());
            }
        }

        for (field, value) in [
            ("manifest_file", manifest_file.is_empty()),
            ("commands.lockfile_refresh", commands.lockfile_refresh.is_empty()),
            ("commands.release", commands.release.is_empty()),
            ("commands.tolerate_stderr", commands.tolerate_stderr.is_empty()),
            ("git.commit_message", git.commit_message.trim().is_empty()),
        ] {
            if value {
                return Err(PlanError::EmptySetting {
                    field: field.to_string(),
                }
                .into());
            }
        }

        Ok(Self {
            manifest_file,
            commands,
            git,
            packages,
            known_names,
        })
    }

    /// Load a plan file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PlanError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &content)
    }

    /// Parse plan text; `path` is used for error messages only
    pub fn from_toml_str<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        let file: PlanFile = toml::from_str(content).map_err(|source| PlanError::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        log::debug!(
            "Loaded release plan {} with {} package(s)",
            path.as_ref().display(),
            file.packages.len()
        );

        Self::from_parts(file.manifest_file, file.commands, file.git, file.packages)
    }

    /// Packages in propagation order
    pub fn packages(&self) -> &[PlannedPackage] {
        &self.packages
    }

    /// Whether `name` is a workspace package eligible for pin rewriting
    pub fn is_known(&self, name: &str) -> bool {
        self.known_names.contains(name)
    }

    /// All package names in the plan
    pub fn known_names(&self) -> &HashSet<String> {
        &self.known_names
    }

    /// Index of `directory` in the propagation order
    pub fn position_of(&self, directory: &str) -> Option<usize> {
        let wanted = normalize_directory(directory);
        self.packages
            .iter()
            .position(|package| normalize_directory(&package.directory) == wanted)
    }

    /// Manifest file name used inside each package directory
    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    /// External command lines
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Git settings
    pub fn git(&self) -> &GitSettings {
        &self.git
    }

    /// Absolute package directory
    pub fn package_dir(&self, workspace_root: &Path, package: &PlannedPackage) -> PathBuf {
        workspace_root.join(&package.directory)
    }

    /// Manifest path of a package
    pub fn manifest_path(&self, workspace_root: &Path, package: &PlannedPackage) -> PathBuf {
        self.package_dir(workspace_root, package)
            .join(&self.manifest_file)
    }
}

fn normalize_directory(directory: &str) -> &str {
    directory
        .trim_start_matches("./")
        .trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
[[package]]
directory = "common"
name = "libyal-rs-common"

[[package]]
directory = "libbfio-sys"
name = "libbfio-sys"

[[package]]
directory = "libbfio"
name = "libbfio-rs"
"#;

    #[test]
    fn parses_packages_in_order_with_defaults() {
        let plan = ReleasePlan::from_toml_str("release-plan.toml", PLAN).unwrap();

        let directories: Vec<_> = plan.packages().iter().map(|p| p.directory.as_str()).collect();
        assert_eq!(directories, ["common", "libbfio-sys", "libbfio"]);
        assert!(plan.is_known("libbfio-rs"));
        assert!(!plan.is_known("libbfio"));
        assert_eq!(plan.manifest_file(), "Cargo.toml");
        assert_eq!(plan.commands(), &CommandSet::default());
        assert_eq!(plan.commands().tolerate_stderr, "already");
    }

    #[test]
    fn partial_command_override_keeps_other_defaults() {
        let content = format!(
            "manifest_file = \"Crate.toml\"\n[commands]\nrelease = [\"cargo\", \"publish\"]\n\n[git]\nremote = \"upstream\"\n{PLAN}"
        );
        let plan = ReleasePlan::from_toml_str("plan.toml", &content).unwrap();

        assert_eq!(plan.commands().release, ["cargo", "publish"]);
        assert_eq!(plan.commands().lockfile_refresh, ["cargo", "check"]);
        assert_eq!(plan.git().remote.as_deref(), Some("upstream"));
        assert_eq!(
            plan.manifest_path(Path::new("/ws"), &plan.packages()[2]),
            PathBuf::from("/ws/libbfio/Crate.toml")
        );
    }

    #[test]
    fn commit_message_substitutes_placeholders() {
        let git = GitSettings::default();
        assert_eq!(
            git.commit_message("libbfio", &SemanticVersion::new(0, 2, 8)),
            "bump libbfio version to 0.2.8"
        );
    }

    #[test]
    fn rejects_empty_plan() {
        let err = ReleasePlan::from_toml_str("plan.toml", "").unwrap_err();
        assert!(matches!(err, crate::error::ReleaseError::Plan(PlanError::Empty)));
    }

    #[test]
    fn rejects_duplicates() {
        let err = ReleasePlan::new(vec![
            PlannedPackage::new("a", "a"),
            PlannedPackage::new("a", "b"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Directory 'a'"));

        let err = ReleasePlan::new(vec![
            PlannedPackage::new("a", "x"),
            PlannedPackage::new("b", "x"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Package 'x'"));
    }

    #[test]
    fn rejects_same_directory_spelled_differently() {
        let err = ReleasePlan::new(vec![
            PlannedPackage::new("a", "a"),
            PlannedPackage::new("./a/", "a-again"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Plan(PlanError::DuplicateDirectory { ref directory })
                if directory == "./a/"
        ));
    }

    #[test]
    fn rejects_empty_tolerance_marker() {
        let content = format!("[commands]\ntolerate_stderr = \"\"\n{PLAN}");
        let err = ReleasePlan::from_toml_str("plan.toml", &content).unwrap_err();
        assert!(err.to_string().contains("commands.tolerate_stderr"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let content = format!("[[package]]\ndirectory = \"a\"\nname = \"a\"\nversion = \"1.0.0\"\n{PLAN}");
        let err = ReleasePlan::from_toml_str("plan.toml", &content).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Plan(PlanError::Parse { .. })
        ));
    }

    #[test]
    fn position_ignores_dot_slash_and_trailing_slash() {
        let plan = ReleasePlan::from_toml_str("plan.toml", PLAN).unwrap();
        assert_eq!(plan.position_of("./libbfio/"), Some(2));
        assert_eq!(plan.position_of("libfsntfs"), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ReleasePlan::load("/definitely/not/here/release-plan.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Plan(PlanError::NotFound { .. })
        ));
    }
}
