//! Command execution functions.
//!
//! Each command resolves the workspace and plan, does its work, and reports
//! failures with recovery suggestions. The returned value is the process
//! exit code.

mod helpers;
mod preview;
mod release;
mod validate;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use preview::execute_preview;
use release::execute_release;
use validate::execute_validate;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Release { .. } => execute_release(&args, &config).await,
        Command::Validate { .. } => execute_validate(&args, &config).await,
        Command::Preview { .. } => execute_preview(&args, &config).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() && !args.command.json() {
                config.println("\nRecovery suggestions:");
                for suggestion in suggestions {
                    config.indent(&format!("• {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
