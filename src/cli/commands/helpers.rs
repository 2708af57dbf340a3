//! Shared helper functions for command execution.

use crate::cli::{PlanArgs, RuntimeConfig};
use crate::error::{PlanError, Result};
use crate::plan::ReleasePlan;
use std::path::PathBuf;

/// Resolve the workspace root and load its release plan
pub(super) fn load_target(target: &PlanArgs, config: &RuntimeConfig) -> Result<(PathBuf, ReleasePlan)> {
    let workspace_root = target.workspace.canonicalize().map_err(|_| {
        PlanError::WorkspaceNotFound {
            path: target.workspace.clone(),
        }
    })?;

    let plan_path = target.plan_path();
    config.verbose_println(&format!("Using release plan {}", plan_path.display()));
    let plan = ReleasePlan::load(&plan_path)?;

    log::debug!(
        "Workspace {} with {} planned package(s)",
        workspace_root.display(),
        plan.packages().len()
    );

    Ok((workspace_root, plan))
}
