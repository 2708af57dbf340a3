//! Validate command implementation.
//!
//! Checks the release plan against the manifests on disk.

use super::helpers::load_target;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{PlanError, ReleaseError, Result};
use crate::plan::{PlanValidator, ValidationResult};

/// Execute validate command
pub(super) async fn execute_validate(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Validate { target, json } = &args.command else {
        return Err(ReleaseError::Cli(crate::error::CliError::InvalidArguments {
            reason: "Invalid command for validate execution".to_string(),
        }));
    };

    config.verbose_println("Validating release plan...");
    let (workspace_root, plan) = load_target(target, config)?;
    let validation = PlanValidator::new(&plan, &workspace_root).validate()?;

    if *json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
    } else {
        print_validation(&validation, config);
    }

    if validation.success {
        Ok(())
    } else {
        Err(PlanError::ValidationFailed {
            reasons: validation.critical_errors,
        }
        .into())
    }
}

pub(super) fn print_validation(validation: &ValidationResult, config: &RuntimeConfig) {
    config.println(&validation.summary());
    for check in &validation.checks {
        config.indent(&check.format_result());
    }

    if !validation.warnings.is_empty() {
        config.println("");
        for warning in &validation.warnings {
            config.warning_println(warning);
        }
    }

    if let Some(order) = &validation.suggested_order {
        config.println("\nSuggested order:");
        for (index, directory) in order.iter().enumerate() {
            config.indent(&format!("{}. {}", index + 1, directory));
        }
    }

    if validation.success {
        config.success_println("Release plan is valid");
    }
}
