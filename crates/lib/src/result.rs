//! Validation result accumulator.
//!
//! Every check in this crate appends to a [`ValidationResult`]. Errors are
//! policy violations and flip `valid` to false; warnings are advisory and
//! never touch it.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of one validation pass over one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
  /// The artifact (file or deployment directory) that was validated.
  pub path: PathBuf,
  /// Starts true and only ever moves to false.
  pub valid: bool,
  /// Policy violations, in the order they were found.
  pub errors: Vec<String>,
  /// Advisory findings, in the order they were found.
  pub warnings: Vec<String>,
}

impl ValidationResult {
  /// Create an empty, valid result for `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      valid: true,
      errors: Vec::new(),
      warnings: Vec::new(),
    }
  }

  /// Record a policy violation.
  pub fn error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
    self.valid = false;
  }

  /// Record an advisory finding.
  pub fn warn(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
  }

  pub fn has_findings(&self) -> bool {
    !self.errors.is_empty() || !self.warnings.is_empty()
  }
}
