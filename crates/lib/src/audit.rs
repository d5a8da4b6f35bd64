//! Whole-tree audit.
//!
//! Discovers every deployment under a root and runs each applicable check on
//! it. Each check run is timed and recorded, and its findings are also folded
//! into the deployment's [`StructureResult`] so the aggregated report shows
//! everything wrong with a deployment in one entry. Given a configs root, the
//! structural mirror check runs first, once for the whole tree.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::compose::validate_compose_file;
use crate::deployment::{
  Deployment, DeploymentLevel, StructureResult, deployment_config_files, discover_deployments, find_compose_file,
  validate_structure,
};
use crate::mirror::{MirrorResult, validate_structural_mirror};
use crate::policy::Policy;
use crate::ports::validate_ports;
use crate::result::ValidationResult;
use crate::secrets::validate_secrets;
use crate::service_config::validate_config_file;

pub const CHECK_STRUCTURE: &str = "structure";
pub const CHECK_COMPOSE: &str = "compose";
pub const CHECK_SECRETS: &str = "secrets";
pub const CHECK_CONFIG: &str = "config";
pub const CHECK_PORTS: &str = "ports";
pub const CHECK_MIRROR: &str = "mirror";

/// One timed check run against one target.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRun {
  pub name: String,
  pub target: PathBuf,
  pub passed: bool,
  pub duration: Duration,
}

/// Everything produced by [`audit_tree`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
  pub runs: Vec<CheckRun>,
  pub deployments: Vec<StructureResult>,
  /// Present when a configs root was given.
  pub mirror: Option<MirrorResult>,
  /// Deployments never started because the time budget ran out.
  pub not_run: Vec<String>,
  pub total_duration: Duration,
}

impl AuditReport {
  pub fn passed(&self) -> bool {
    self.not_run.is_empty() && self.runs.iter().all(|r| r.passed)
  }

  pub fn failed_runs(&self) -> impl Iterator<Item = &CheckRun> {
    self.runs.iter().filter(|r| !r.passed)
  }
}

/// Run every applicable check on every deployment under `root`.
///
/// With `configs`, `root` is also checked against it with
/// [`validate_structural_mirror`]; a root that cannot be listed fails that run.
/// With a `budget`, deployments not yet started when it elapses are recorded
/// in [`AuditReport::not_run`] instead of being checked.
pub fn audit_tree(root: &Path, configs: Option<&Path>, policy: &Policy, budget: Option<Duration>) -> AuditReport {
  let started = Instant::now();
  let mut report = AuditReport::default();

  if let Some(configs) = configs {
    let start = Instant::now();
    let mirror = validate_structural_mirror(root, configs).unwrap_or_else(|e| {
      warn!(error = %e, "structural mirror check could not run");
      MirrorResult::failed(e.to_string())
    });
    report.runs.push(CheckRun {
      name: CHECK_MIRROR.to_string(),
      target: configs.to_path_buf(),
      passed: mirror.valid,
      duration: start.elapsed(),
    });
    report.mirror = Some(mirror);
  }

  for deployment in discover_deployments(root) {
    if budget.is_some_and(|b| started.elapsed() >= b) {
      warn!(deployment = %deployment.name, "time budget exhausted, not running");
      report.not_run.push(deployment.name);
      continue;
    }
    let entry = audit_deployment(&deployment, policy, &mut report.runs);
    report.deployments.push(entry);
  }

  report.total_duration = started.elapsed();
  info!(
    deployments = report.deployments.len(),
    runs = report.runs.len(),
    passed = report.passed(),
    "audit finished"
  );
  report
}

fn timed<F>(runs: &mut Vec<CheckRun>, name: &str, target: &Path, check: F) -> ValidationResult
where
  F: FnOnce() -> ValidationResult,
{
  let start = Instant::now();
  let result = check();
  runs.push(CheckRun {
    name: name.to_string(),
    target: target.to_path_buf(),
    passed: result.valid,
    duration: start.elapsed(),
  });
  result
}

/// Copy a check's findings into the deployment entry, tagged with the check name.
fn fold(entry: &mut StructureResult, check: &str, result: &ValidationResult) {
  for e in &result.errors {
    entry.error(format!("[{}] {}", check, e));
  }
  for w in &result.warnings {
    entry.warn(format!("[{}] {}", check, w));
  }
}

/// Run the checks that apply to one deployment.
///
/// Infrastructure deployments get the structure and compose checks only.
pub fn audit_deployment(deployment: &Deployment, policy: &Policy, runs: &mut Vec<CheckRun>) -> StructureResult {
  let dir = deployment.path.as_path();
  let level = deployment.level;

  let start = Instant::now();
  let mut entry = validate_structure(dir, &deployment.name, level);
  runs.push(CheckRun {
    name: CHECK_STRUCTURE.to_string(),
    target: dir.to_path_buf(),
    passed: entry.valid,
    duration: start.elapsed(),
  });

  if let Some(compose) = find_compose_file(dir) {
    let result = timed(runs, CHECK_COMPOSE, &compose, || validate_compose_file(&compose, policy));
    fold(&mut entry, CHECK_COMPOSE, &result);
  }

  if level == DeploymentLevel::Infrastructure {
    return entry;
  }

  let result = timed(runs, CHECK_SECRETS, dir, || validate_secrets(dir, policy));
  fold(&mut entry, CHECK_SECRETS, &result);

  for config in deployment_config_files(dir) {
    let result = timed(runs, CHECK_CONFIG, &config, || validate_config_file(&config));
    fold(&mut entry, CHECK_CONFIG, &result);
  }

  let result = timed(runs, CHECK_PORTS, dir, || validate_ports(dir, &deployment.name, level, policy));
  fold(&mut entry, CHECK_PORTS, &result);

  entry
}
