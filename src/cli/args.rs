//! Command line argument parsing and validation.

use crate::plan::DEFAULT_PLAN_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Patch-bump and release every package of a workspace in plan order
#[derive(Parser, Debug)]
#[command(
    name = "cargo_bump_release",
    version,
    about = "Patch-bump and release workspace packages in dependency order",
    long_about = "Bump the patch version of each package listed in release-plan.toml,
rewrite workspace dependency pins, commit, and run cargo release per package.

Usage:
  cargo_bump_release validate
  cargo_bump_release preview --json
  cargo_bump_release release --dry-run
  cargo_bump_release release --start-at libbfio"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Show every pin rewrite and echo external command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Workspace and plan location shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Workspace root containing the package directories
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = ".",
        env = "BUMP_RELEASE_WORKSPACE"
    )]
    pub workspace: PathBuf,

    /// Release plan file (defaults to <workspace>/release-plan.toml)
    #[arg(short, long, value_name = "FILE", env = "BUMP_RELEASE_PLAN")]
    pub plan: Option<PathBuf>,
}

impl PlanArgs {
    /// Plan file location after applying the default
    pub fn plan_path(&self) -> PathBuf {
        self.plan
            .clone()
            .unwrap_or_else(|| self.workspace.join(DEFAULT_PLAN_FILE))
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Bump, commit and release every package in plan order
    Release {
        /// Workspace and plan location
        #[command(flatten)]
        target: PlanArgs,

        /// Print what would happen; write nothing and run no commands
        #[arg(long)]
        dry_run: bool,

        /// Skip the final git push
        #[arg(long)]
        no_push: bool,

        /// Resume at this plan directory (earlier packages count as released)
        #[arg(long, value_name = "DIR")]
        start_at: Option<String>,

        /// Release even if the plan lists a dependent before its dependency
        /// (name and version checks still apply)
        #[arg(long)]
        allow_unordered: bool,
    },

    /// Check manifests and plan order without changing anything
    Validate {
        /// Workspace and plan location
        #[command(flatten)]
        target: PlanArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the versions and pins a release would produce
    Preview {
        /// Workspace and plan location
        #[command(flatten)]
        target: PlanArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release { .. } => "release",
            Command::Validate { .. } => "validate",
            Command::Preview { .. } => "preview",
        }
    }

    /// Whether stdout is reserved for JSON
    pub fn json(&self) -> bool {
        match self {
            Command::Release { .. } => false,
            Command::Validate { json, .. } | Command::Preview { json, .. } => *json,
        }
    }

    /// Workspace and plan location
    pub fn target(&self) -> &PlanArgs {
        match self {
            Command::Release { target, .. }
            | Command::Validate { target, .. }
            | Command::Preview { target, .. } => target,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Release {
            start_at: Some(directory),
            ..
        } = &self.command
            && directory.trim().is_empty()
        {
            return Err("--start-at needs a plan directory".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message in verbose mode only
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
