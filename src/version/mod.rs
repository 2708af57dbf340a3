//! Version parsing and manifest editing.
//!
//! This module provides the `MAJOR.MINOR.PATCH` value type used for patch
//! bumps and the format-preserving manifest editor that writes bumped
//! versions and dependency pins back to `Cargo.toml`.

mod editor;
mod semantic;

pub use editor::{DeclaredDependency, DependencyKind, ManifestEditor, PinUpdate};
pub use semantic::SemanticVersion;
