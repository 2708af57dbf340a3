//! Git operations for release workflows.
//!
//! This module provides the stage/commit/push sequence the release loop runs
//! after each manifest rewrite, executed through the system `git` binary.

mod operations;

pub use operations::{GitOperations, PushInfo};
