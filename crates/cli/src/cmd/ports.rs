//! Implementation of the `deplint ports` command.

use std::path::Path;

use anyhow::Result;

use deplint_lib::Policy;
use deplint_lib::deployment::DeploymentLevel;
use deplint_lib::ports::validate_ports;

use super::{deployment_identity, emit};
use crate::output::OutputFormat;

pub fn cmd_ports(
  dir: &Path,
  name: Option<String>,
  level: Option<DeploymentLevel>,
  policy: &Policy,
  format: OutputFormat,
) -> Result<bool> {
  let (name, level) = deployment_identity(dir, name, level)?;
  let result = validate_ports(dir, &name, level, policy);
  emit(&format!("Port Validation ({})", level), &result, format)
}
