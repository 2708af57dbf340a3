//! Preview command implementation.
//!
//! Runs the propagation in dry-run mode against a runner that executes
//! nothing, then prints the resulting versions and pins.

use super::helpers::load_target;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, ReleaseError, Result};
use crate::process::DryRunRunner;
use crate::release::{Propagator, PropagatorOptions};

/// Execute preview command
pub(super) async fn execute_preview(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Preview { target, json } = &args.command else {
        return Err(ReleaseError::Cli(CliError::InvalidArguments {
            reason: "Invalid command for preview execution".to_string(),
        }));
    };

    let (workspace_root, plan) = load_target(target, config)?;

    // Progress lines would interleave with the preview itself
    let silent = RuntimeConfig::new(false, true);
    let report = Propagator::new(&plan, &workspace_root, &DryRunRunner, &silent)
        .with_options(PropagatorOptions {
            dry_run: true,
            push: false,
            start_at: None,
        })
        .run()
        .await?;

    if *json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    config.section("Release preview");
    for package in &report.packages {
        config.println(&format!(
            "{} ({}): {} → {}",
            package.name, package.directory, package.previous_version, package.new_version
        ));
        for pin in &package.pins {
            let target = pin
                .target
                .as_deref()
                .map(|cfg| format!("target.{}.", cfg))
                .unwrap_or_default();
            config.indent(&format!(
                "{}{}.{}: {} → {}",
                target,
                pin.kind.table_name(),
                pin.dependency,
                pin.previous.as_deref().unwrap_or("(none)"),
                pin.pinned
            ));
        }
        config.indent(&format!("commit: {}", package.commit_message));
    }

    Ok(())
}
