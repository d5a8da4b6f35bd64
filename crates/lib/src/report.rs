//! Plain-text rendering of results.
//!
//! Output is deterministic for identical inputs: no timestamps, and entries
//! are sorted before rendering. Durations only appear in the audit summary.

use std::fmt::Write;

use crate::audit::AuditReport;
use crate::deployment::StructureResult;
use crate::mirror::MirrorResult;
use crate::result::ValidationResult;

/// Render one result under `title`.
pub fn format_result(title: &str, result: &ValidationResult) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}: {}", title, result.path.display());
  let _ = writeln!(out, "  Status: {}", if result.valid { "PASS" } else { "FAIL" });
  for e in &result.errors {
    let _ = writeln!(out, "  ERROR: {}", e);
  }
  for w in &result.warnings {
    let _ = writeln!(out, "  WARNING: {}", w);
  }
  out
}

/// Render the per-deployment report: invalid entries first, then by path.
pub fn format_structure_report(results: &[StructureResult]) -> String {
  let valid = results.iter().filter(|r| r.valid).count();
  let mut out = String::new();
  let _ = write!(
    out,
    "Validated {} deployments: {} valid, {} with issues\n\n",
    results.len(),
    valid,
    results.len() - valid
  );

  let mut sorted: Vec<&StructureResult> = results.iter().collect();
  sorted.sort_by(|a, b| a.valid.cmp(&b.valid).then_with(|| a.path.cmp(&b.path)));

  for r in sorted {
    let status = if r.valid { "✅ VALID" } else { "❌ INVALID" };
    let _ = writeln!(out, "{} {} ({})", status, r.path.display(), r.level);
    if !r.missing_dirs.is_empty() {
      let _ = writeln!(out, "  Missing directories: {}", r.missing_dirs.join(", "));
    }
    if !r.missing_files.is_empty() {
      let _ = writeln!(out, "  Missing files: {}", r.missing_files.join(", "));
    }
    if !r.missing_secrets.is_empty() {
      let _ = writeln!(out, "  Missing secrets: {}", r.missing_secrets.join(", "));
    }
    for e in &r.errors {
      let _ = writeln!(out, "  ERROR: {}", e);
    }
    for w in &r.warnings {
      let _ = writeln!(out, "  WARN: {}", w);
    }
  }
  out
}

/// Render the check-run summary of an audit.
pub fn format_audit_summary(report: &AuditReport) -> String {
  let mut out = String::from("=== Validate All: Aggregated Results ===\n\n");

  for run in &report.runs {
    let status = if run.passed { "PASS" } else { "FAIL" };
    let _ = writeln!(
      out,
      "  [{}] {} ({}) {}ms",
      status,
      run.name,
      run.target.display(),
      run.duration.as_millis()
    );
  }

  let failed = report.failed_runs().count();
  let _ = write!(
    out,
    "\nPassed:   {}\nFailed:   {}\nTotal:    {} validators\n",
    report.runs.len() - failed,
    failed,
    report.runs.len()
  );

  if !report.not_run.is_empty() {
    let _ = writeln!(out, "Not run (time budget exhausted): {}", report.not_run.join(", "));
  }

  if failed > 0 {
    out.push_str("\nFailed validators:\n");
    for run in report.failed_runs() {
      let _ = writeln!(out, "  - {} ({})", run.name, run.target.display());
    }
  }

  out.push_str(if report.passed() {
    "\nALL VALIDATORS PASSED\n"
  } else {
    "\nVALIDATION FAILED\n"
  });
  out
}

/// Render a structural mirror result. Empty sections are omitted.
pub fn format_mirror_result(result: &MirrorResult) -> String {
  let mut out = String::from("=== Structural Mirror: deployments -> configs ===\n");
  let _ = writeln!(
    out,
    "  Status: {} (missing={}, orphans={})",
    if result.valid { "PASS" } else { "FAIL" },
    result.missing_mirrors.len(),
    result.orphans.len()
  );
  for (label, items) in [
    ("Excluded", &result.excluded),
    ("Errors", &result.errors),
    ("Warnings", &result.warnings),
  ] {
    if items.is_empty() {
      continue;
    }
    let _ = writeln!(out, "  {} ({}):", label, items.len());
    for item in items {
      let _ = writeln!(out, "    - {}", item);
    }
  }
  out
}
