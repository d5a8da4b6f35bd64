//! Implementation of the `deplint all` command.
//!
//! Audits every deployment under a root, prints the per-deployment report,
//! the mirror report when a configs root is given, the per-check summary and
//! how long each kind of check took in total.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};

use deplint_lib::Policy;
use deplint_lib::audit::audit_tree;
use deplint_lib::report::{format_audit_summary, format_mirror_result, format_structure_report};

use crate::output::{OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success};

pub fn cmd_all(
  root: &Path,
  configs: Option<&Path>,
  budget: Option<Duration>,
  policy: &Policy,
  format: OutputFormat,
) -> Result<bool> {
  if !root.is_dir() {
    bail!("Deployments root is not a directory: {}", root.display());
  }
  if let Some(configs) = configs.filter(|c| !c.is_dir()) {
    bail!("Configs root is not a directory: {}", configs.display());
  }

  let report = audit_tree(root, configs, policy, budget);

  if format.is_json() {
    print_json(&report)?;
    return Ok(report.passed());
  }

  print!("{}", format_structure_report(&report.deployments));
  println!();
  if let Some(mirror) = &report.mirror {
    print!("{}", format_mirror_result(mirror));
    println!();
  }
  print!("{}", format_audit_summary(&report));
  println!();

  let mut per_check: BTreeMap<&str, Duration> = BTreeMap::new();
  for run in &report.runs {
    *per_check.entry(run.name.as_str()).or_default() += run.duration;
  }
  print_info("Time per check:");
  for (name, total) in &per_check {
    print_stat(name, &format_duration(*total));
  }
  print_stat("total", &format_duration(report.total_duration));

  if report.passed() {
    print_success(&format!("{} deployment(s) passed", report.deployments.len()));
  } else if !report.not_run.is_empty() {
    print_error(&format!("Time budget exhausted; {} deployment(s) not run", report.not_run.len()));
  } else {
    print_error("Validation failed");
  }

  Ok(report.passed())
}
