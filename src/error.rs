//! Error types for bump-and-release operations.
//!
//! Every fatal condition is a variant here. The run loop wraps per-package
//! failures in [`ReleaseError::RunFailure`] so the caller learns which plan
//! entry stopped the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version parsing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Manifest read/parse/write errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// External command errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Release plan errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// A package in the plan failed; nothing after it was touched
    #[error("Release stopped at package #{position} ('{directory}'): {source}")]
    RunFailure {
        /// 1-based position of the package in the plan
        position: usize,
        /// Plan directory of the failing package
        directory: String,
        /// Underlying failure
        source: Box<ReleaseError>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Text does not contain a MAJOR.MINOR.PATCH triple
    #[error("Malformed version '{text}': expected MAJOR.MINOR.PATCH")]
    Malformed {
        /// Text that failed to parse
        text: String,
    },

    /// A component does not fit in 64 bits
    #[error("Version component '{component}' in '{text}' is out of range")]
    ComponentOutOfRange {
        /// Full text being parsed
        text: String,
        /// Offending component
        component: String,
    },
}

/// Manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid TOML
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Manifest path
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml_edit::TomlError,
    },

    /// Manifest could not be written back
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Required field absent
    #[error("Missing '{field}' in {path}")]
    MissingField {
        /// Manifest path
        path: PathBuf,
        /// Dotted field name
        field: String,
    },

    /// Field present but unusable
    #[error("Invalid '{field}' in {path}: {reason}")]
    InvalidField {
        /// Manifest path
        path: PathBuf,
        /// Dotted field name
        field: String,
        /// Reason for the error
        reason: String,
    },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Program is not on PATH
    #[error("Program '{program}' not found: {reason}")]
    NotFound {
        /// Program name
        program: String,
        /// Reason reported by the lookup
        reason: String,
    },

    /// Process could not be started
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully
    #[error("`{command}` exited with {}: {}", exit_label(.code), .stderr.trim())]
    Failed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Release plan errors
#[derive(Error, Debug)]
pub enum PlanError {
    /// Plan file does not exist
    #[error("Release plan not found at {path}")]
    NotFound {
        /// Expected plan location
        path: PathBuf,
    },

    /// Plan file could not be read
    #[error("Failed to read release plan {path}: {source}")]
    Read {
        /// Plan path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Plan file is not valid
    #[error("Failed to parse release plan {path}: {source}")]
    Parse {
        /// Plan path
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Plan lists no packages
    #[error("Release plan contains no packages")]
    Empty,

    /// Same directory listed twice
    #[error("Directory '{directory}' is listed more than once")]
    DuplicateDirectory {
        /// Duplicated directory
        directory: String,
    },

    /// Same package name listed twice
    #[error("Package '{name}' is listed more than once")]
    DuplicatePackage {
        /// Duplicated name
        name: String,
    },

    /// A configured command or setting is empty
    #[error("'{field}' must not be empty")]
    EmptySetting {
        /// Setting name
        field: String,
    },

    /// `--start-at` names a directory outside the plan
    #[error("Directory '{directory}' is not part of the release plan")]
    UnknownDirectory {
        /// Requested directory
        directory: String,
    },

    /// Workspace root missing
    #[error("Workspace directory {path} does not exist")]
    WorkspaceNotFound {
        /// Requested root
        path: PathBuf,
    },

    /// Plan order or manifests failed validation
    #[error("Release plan failed validation: {}", .reasons.join("; "))]
    ValidationFailed {
        /// Critical problems found
        reasons: Vec<String>,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Wrap a per-package failure with its plan position
    pub fn at_package(self, index: usize, directory: &str) -> Self {
        ReleaseError::RunFailure {
            position: index + 1,
            directory: directory.to_string(),
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through [`ReleaseError::RunFailure`]
    pub fn root_cause(&self) -> &ReleaseError {
        match self {
            ReleaseError::RunFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        let mut suggestions = match self.root_cause() {
            ReleaseError::Version(_) => vec![
                "Set package.version to a plain MAJOR.MINOR.PATCH value".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::InvalidField { field, .. })
                if field == "package.version" =>
            {
                vec![
                    "Versions inherited from [workspace.package] cannot be bumped per package"
                        .to_string(),
                    "Give the package an explicit version = \"X.Y.Z\"".to_string(),
                ]
            }
            ReleaseError::Plan(PlanError::NotFound { .. }) => vec![
                "Create release-plan.toml at the workspace root".to_string(),
                "Or point --plan / BUMP_RELEASE_PLAN at an existing plan".to_string(),
            ],
            ReleaseError::Plan(PlanError::ValidationFailed { .. }) => vec![
                "Run the validate command to see the suggested order".to_string(),
                "Pass --allow-unordered if only the propagation order check failed".to_string(),
            ],
            ReleaseError::Command(CommandError::NotFound { program, .. }) => vec![format!(
                "Install '{}' or add it to PATH",
                program
            )],
            ReleaseError::Command(CommandError::Failed { command, .. })
                if command.starts_with("git commit") =>
            {
                vec![
                    "Check that git user.name and user.email are configured".to_string(),
                    "Make sure the bump produced a change to commit".to_string(),
                ]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        };

        if let ReleaseError::RunFailure { directory, .. } = self {
            suggestions.push(format!(
                "Packages before '{}' are already committed; rerun with --start-at {} after fixing",
                directory, directory
            ));
        }

        suggestions
    }
}
