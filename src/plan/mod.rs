//! Release plan: the externally supplied propagation order.
//!
//! This module loads the ordered `{directory, name}` records that drive a
//! release and validates them against the manifests on disk.

mod config;
mod validator;

pub use config::{
    CommandSet, DEFAULT_MANIFEST_FILE, DEFAULT_PLAN_FILE, GitSettings, PlannedPackage,
    ReleasePlan,
};
pub use validator::{PlanValidator, ValidationCheck, ValidationResult};
