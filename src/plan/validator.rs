//! Release plan validation.
//!
//! Checks the manifests behind a plan before anything is bumped: every
//! manifest loads, names match, versions parse, and every workspace
//! dependency is listed before its dependents.

use crate::error::Result;
use crate::plan::{PlannedPackage, ReleasePlan};
use crate::version::{DeclaredDependency, ManifestEditor, SemanticVersion};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Plan validator
#[derive(Debug)]
pub struct PlanValidator<'a> {
    plan: &'a ReleasePlan,
    workspace_root: PathBuf,
    order_is_critical: bool,
}

/// Validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No critical check failed
    pub success: bool,
    /// Every check that ran
    pub checks: Vec<ValidationCheck>,
    /// Messages of failed critical checks
    pub critical_errors: Vec<String>,
    /// Non-blocking findings
    pub warnings: Vec<String>,
    /// Dependency-respecting directory order, present when the plan order is wrong
    pub suggested_order: Option<Vec<String>>,
}

/// Individual validation check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Check name
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Result description
    pub message: String,
    /// Whether a failure blocks the release
    pub critical: bool,
}

impl ValidationCheck {
    /// One-line rendering for terminal output
    pub fn format_result(&self) -> String {
        let mark = if self.passed { "✓" } else if self.critical { "✗" } else { "⚠" };
        format!("{} {}: {}", mark, self.name, self.message)
    }
}

/// Manifest facts gathered once per plan entry
struct LoadedPackage {
    manifest_name: String,
    version: Option<SemanticVersion>,
    dependencies: Vec<DeclaredDependency>,
}

impl<'a> PlanValidator<'a> {
    /// Create a validator for `plan` rooted at `workspace_root`
    pub fn new<P: AsRef<Path>>(plan: &'a ReleasePlan, workspace_root: P) -> Self {
        Self {
            plan,
            workspace_root: workspace_root.as_ref().to_path_buf(),
            order_is_critical: true,
        }
    }

    /// Report propagation order violations as warnings instead of failures.
    /// Name, version and manifest checks stay critical.
    pub fn allow_unordered(mut self, allow: bool) -> Self {
        self.order_is_critical = !allow;
        self
    }

    /// Run every check
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut checks = Vec::new();
        let mut critical_errors = Vec::new();
        let mut warnings = Vec::new();

        let loaded = self.load_manifests(&mut checks, &mut critical_errors);
        let Some(loaded) = loaded else {
            return Ok(ValidationResult {
                success: false,
                checks,
                critical_errors,
                warnings,
                suggested_order: None,
            });
        };

        self.check_names(&loaded, &mut checks, &mut critical_errors);
        self.check_versions(&loaded, &mut checks, &mut critical_errors);
        let suggested_order = if self.order_is_critical {
            self.check_order(&loaded, &mut checks, &mut critical_errors)
        } else {
            self.check_order(&loaded, &mut checks, &mut warnings)
        };
        self.check_pins(&loaded, &mut checks, &mut warnings);

        Ok(ValidationResult {
            success: critical_errors.is_empty(),
            checks,
            critical_errors,
            warnings,
            suggested_order,
        })
    }

    fn load_manifests(
        &self,
        checks: &mut Vec<ValidationCheck>,
        critical_errors: &mut Vec<String>,
    ) -> Option<Vec<LoadedPackage>> {
        let mut loaded = Vec::with_capacity(self.plan.packages().len());
        let mut failures = Vec::new();

        for package in self.plan.packages() {
            match self.load_one(package) {
                Ok(entry) => loaded.push(entry),
                Err(e) => failures.push(format!("{}: {}", package.directory, e)),
            }
        }

        if failures.is_empty() {
            checks.push(ValidationCheck {
                name: "Manifests".to_string(),
                passed: true,
                message: format!("{} manifest(s) loaded", loaded.len()),
                critical: true,
            });
            Some(loaded)
        } else {
            checks.push(ValidationCheck {
                name: "Manifests".to_string(),
                passed: false,
                message: failures.join("; "),
                critical: true,
            });
            critical_errors.extend(failures);
            None
        }
    }

    fn load_one(&self, package: &PlannedPackage) -> Result<LoadedPackage> {
        let editor = ManifestEditor::open(self.plan.manifest_path(&self.workspace_root, package))?;
        Ok(LoadedPackage {
            manifest_name: editor.package_name()?.to_string(),
            version: editor
                .package_version()
                .ok()
                .and_then(|text| SemanticVersion::parse(text).ok()),
            dependencies: editor.dependencies(),
        })
    }

    fn check_names(
        &self,
        loaded: &[LoadedPackage],
        checks: &mut Vec<ValidationCheck>,
        critical_errors: &mut Vec<String>,
    ) {
        let mismatches: Vec<String> = self
            .plan
            .packages()
            .iter()
            .zip(loaded)
            .filter(|(planned, found)| planned.name != found.manifest_name)
            .map(|(planned, found)| {
                format!(
                    "'{}' is planned as '{}' but its manifest names '{}'",
                    planned.directory, planned.name, found.manifest_name
                )
            })
            .collect();

        push_outcome(
            checks,
            critical_errors,
            "Package Names",
            true,
            "All plan names match their manifests".to_string(),
            mismatches,
        );
    }

    fn check_versions(
        &self,
        loaded: &[LoadedPackage],
        checks: &mut Vec<ValidationCheck>,
        critical_errors: &mut Vec<String>,
    ) {
        let malformed: Vec<String> = self
            .plan
            .packages()
            .iter()
            .zip(loaded)
            .filter(|(_, found)| found.version.is_none())
            .map(|(planned, _)| {
                format!(
                    "'{}' has no MAJOR.MINOR.PATCH package.version",
                    planned.directory
                )
            })
            .collect();

        push_outcome(
            checks,
            critical_errors,
            "Versions",
            true,
            "Every package version can be bumped".to_string(),
            malformed,
        );
    }

    /// Every known dependency must sit earlier in the plan than its dependent.
    /// Violations land in `problems`, which is the warning list when
    /// unordered plans are allowed.
    fn check_order(
        &self,
        loaded: &[LoadedPackage],
        checks: &mut Vec<ValidationCheck>,
        problems: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        let packages = self.plan.packages();
        let position: HashMap<&str, usize> = packages
            .iter()
            .enumerate()
            .map(|(index, package)| (package.name.as_str(), index))
            .collect();

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..packages.len()).map(|i| graph.add_node(i)).collect();

        let mut violations = Vec::new();
        for (index, found) in loaded.iter().enumerate() {
            let dependencies: BTreeSet<&str> = found
                .dependencies
                .iter()
                .map(|dependency| dependency.package.as_str())
                .collect();

            for dependency in dependencies {
                let Some(&dep_index) = position.get(dependency) else {
                    continue;
                };
                if dep_index == index {
                    continue;
                }
                graph.update_edge(nodes[dep_index], nodes[index], ());
                if dep_index > index {
                    violations.push(format!(
                        "'{}' depends on '{}' but is released before it",
                        packages[index].directory, packages[dep_index].directory
                    ));
                }
            }
        }

        let suggested = if violations.is_empty() {
            None
        } else {
            match toposort(&graph, None) {
                Ok(order) => Some(
                    order
                        .into_iter()
                        .map(|node| packages[graph[node]].directory.clone())
                        .collect(),
                ),
                Err(cycle) => {
                    violations.push(format!(
                        "dependency cycle through '{}'",
                        packages[graph[cycle.node_id()]].directory
                    ));
                    None
                }
            }
        };

        push_outcome(
            checks,
            problems,
            "Propagation Order",
            self.order_is_critical,
            "Dependencies are released before their dependents".to_string(),
            violations,
        );

        suggested
    }

    /// Pins that the current dependency version does not satisfy
    fn check_pins(
        &self,
        loaded: &[LoadedPackage],
        checks: &mut Vec<ValidationCheck>,
        warnings: &mut Vec<String>,
    ) {
        let versions: HashMap<&str, semver::Version> = loaded
            .iter()
            .filter_map(|found| {
                found
                    .version
                    .map(|version| (found.manifest_name.as_str(), version.to_semver()))
            })
            .collect();

        let mut stale = Vec::new();
        for (planned, found) in self.plan.packages().iter().zip(loaded) {
            for dependency in &found.dependencies {
                if !self.plan.is_known(&dependency.package) {
                    continue;
                }
                let (Some(requirement), Some(current)) = (
                    dependency.requirement.as_deref(),
                    versions.get(dependency.package.as_str()),
                ) else {
                    continue;
                };
                match semver::VersionReq::parse(requirement) {
                    Ok(req) if req.matches(current) => {}
                    Ok(_) => stale.push(format!(
                        "'{}' pins '{}' at {} but it is at {}",
                        planned.directory, dependency.package, requirement, current
                    )),
                    Err(e) => stale.push(format!(
                        "'{}' has an unparseable pin on '{}': {}",
                        planned.directory, dependency.package, e
                    )),
                }
            }
        }

        if stale.is_empty() {
            checks.push(ValidationCheck {
                name: "Dependency Pins".to_string(),
                passed: true,
                message: "All workspace pins match current versions".to_string(),
                critical: false,
            });
        } else {
            checks.push(ValidationCheck {
                name: "Dependency Pins".to_string(),
                passed: false,
                message: format!("{} stale pin(s); the release rewrites them", stale.len()),
                critical: false,
            });
            warnings.extend(stale);
        }
    }
}

fn push_outcome(
    checks: &mut Vec<ValidationCheck>,
    sink: &mut Vec<String>,
    name: &str,
    critical: bool,
    ok_message: String,
    problems: Vec<String>,
) {
    if problems.is_empty() {
        checks.push(ValidationCheck {
            name: name.to_string(),
            passed: true,
            message: ok_message,
            critical,
        });
    } else {
        checks.push(ValidationCheck {
            name: name.to_string(),
            passed: false,
            message: problems.join("; "),
            critical,
        });
        sink.extend(problems);
    }
}

impl ValidationResult {
    /// One-line pass count for terminal output
    pub fn summary(&self) -> String {
        let total_checks = self.checks.len();
        let passed_checks = self.checks.iter().filter(|c| c.passed).count();

        if self.success {
            format!(
                "Plan is releasable ({}/{} checks clean)",
                passed_checks, total_checks
            )
        } else {
            format!("{}/{} checks passed", passed_checks, total_checks)
        }
    }
}
