//! Release command implementation.
//!
//! Validates the plan (order violations only warn with `--allow-unordered`),
//! checks the external tools are installed, and runs the propagation loop.

use super::helpers::load_target;
use super::validate::print_validation;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, PlanError, ReleaseError, Result};
use crate::plan::{PlanValidator, ReleasePlan};
use crate::process::{CommandRunner, DryRunRunner, SystemRunner, ensure_available};
use crate::release::{Propagator, PropagatorOptions, PushStatus, ReleaseReport};
use std::path::Path;

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Release {
        target,
        dry_run,
        no_push,
        start_at,
        allow_unordered,
    } = &args.command
    else {
        return Err(ReleaseError::Cli(CliError::InvalidArguments {
            reason: "Invalid command for release execution".to_string(),
        }));
    };

    let (workspace_root, plan) = load_target(target, config)?;

    if *allow_unordered {
        config.warning_println("Propagation order violations are reported as warnings");
    }
    let validation = PlanValidator::new(&plan, &workspace_root)
        .allow_unordered(*allow_unordered)
        .validate()?;
    if !validation.success {
        print_validation(&validation, config);
        return Err(PlanError::ValidationFailed {
            reasons: validation.critical_errors,
        }
        .into());
    }
    for warning in &validation.warnings {
        config.warning_println(warning);
    }

    let options = PropagatorOptions {
        dry_run: *dry_run,
        push: !*no_push,
        start_at: start_at.clone(),
    };

    let report = if *dry_run {
        config.warning_println("Dry run: manifests stay untouched and no command is executed");
        run(&workspace_root, &plan, &DryRunRunner, config, options).await?
    } else {
        let commands = plan.commands();
        let programs: Vec<&str> = commands
            .lockfile_refresh
            .first()
            .into_iter()
            .chain(commands.release.first())
            .map(String::as_str)
            .chain(std::iter::once("git"))
            .collect();
        ensure_available(programs)?;
        let runner = SystemRunner::new(config.is_verbose());
        run(&workspace_root, &plan, &runner, config, options).await?
    };

    print_report(&report, config);
    Ok(())
}

async fn run<R: CommandRunner>(
    workspace_root: &Path,
    plan: &ReleasePlan,
    runner: &R,
    config: &RuntimeConfig,
    options: PropagatorOptions,
) -> Result<ReleaseReport> {
    Propagator::new(plan, workspace_root, runner, config)
        .with_options(options)
        .run()
        .await
}

fn print_report(report: &ReleaseReport, config: &RuntimeConfig) {
    config.section("Release summary");
    for line in report.format_summary().lines() {
        config.indent(line);
    }
    if !report.skipped.is_empty() {
        config.indent(&format!("skipped: {}", report.skipped.join(", ")));
    }

    match &report.push {
        PushStatus::Pushed => config.success_println("Pushed"),
        PushStatus::Skipped => config.verbose_println("Push skipped"),
        PushStatus::Failed { reason } => {
            config.warning_println(&format!("Push failed and was ignored: {}", reason))
        }
    }

    config.success_println(&format!(
        "{} package(s) bumped{}",
        report.packages.len(),
        if report.already_published() > 0 {
            format!(", {} already published", report.already_published())
        } else {
            String::new()
        }
    ));
}
