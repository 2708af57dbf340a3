//! # cargo_bump_release
//!
//! Patch-level release propagation for multi-crate repositories.
//!
//! Packages are released one at a time in the order given by a release plan.
//! For each package the patch version is bumped, every pin on another planned
//! package is rewritten to that package's freshly released version, and the
//! change is checked, committed and handed to `cargo release`.
//!
//! ## Features
//!
//! - **Format-preserving edits**: Manifests are rewritten with `toml_edit`, so
//!   comments, ordering and unrelated entries survive untouched
//! - **Ordered propagation**: The plan order is validated against the internal
//!   dependency graph before anything is modified
//! - **Rerunnable**: Releases that fail because the version already exists on
//!   the registry are tolerated, and `--start-at` resumes a broken run
//! - **Dry runs**: Preview every bump and pin without touching the repository
//!
//! ## Usage
//!
//! ```bash
//! cargo_bump_release validate              # Check release-plan.toml against the manifests
//! cargo_bump_release preview               # Show the bumps a release would make
//! cargo_bump_release release               # Bump, commit and release every planned package
//! cargo_bump_release release --start-at c  # Resume from directory `c`
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod error;
pub mod git;
pub mod plan;
pub mod process;
pub mod publish;
pub mod release;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use error::{CliError, ReleaseError, Result};
pub use git::{GitOperations, PushInfo};
pub use plan::{PlannedPackage, ReleasePlan, PlanValidator, ValidationResult};
pub use process::{CommandOutput, CommandRunner, DryRunRunner, SystemRunner};
pub use publish::{CargoPublisher, PublishOutcome};
pub use release::{Propagator, PropagatorOptions, ReleaseReport};
pub use version::{ManifestEditor, SemanticVersion};
