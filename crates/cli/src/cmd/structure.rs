//! Implementation of the `deplint structure` command.

use std::path::Path;

use anyhow::Result;

use deplint_lib::deployment::{DeploymentLevel, validate_structure};
use deplint_lib::report::format_structure_report;

use super::deployment_identity;
use crate::output::{OutputFormat, print_json};

pub fn cmd_structure(
  dir: &Path,
  name: Option<String>,
  level: Option<DeploymentLevel>,
  format: OutputFormat,
) -> Result<bool> {
  let (name, level) = deployment_identity(dir, name, level)?;
  let result = validate_structure(dir, &name, level);

  if format.is_json() {
    print_json(&result)?;
  } else {
    print!("{}", format_structure_report(std::slice::from_ref(&result)));
  }

  Ok(result.valid)
}
