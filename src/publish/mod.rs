//! Package publishing operations.
//!
//! This module runs the lockfile refresh after a manifest rewrite and the
//! per-package release command, downgrading "already published" failures to
//! a no-op so a partially completed release can be rerun.

mod cargo_ops;

pub use cargo_ops::{CargoPublisher, PublishOutcome};
