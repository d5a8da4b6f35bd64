//! Implementation of the `deplint compose` command.

use std::path::Path;

use anyhow::Result;

use deplint_lib::Policy;
use deplint_lib::compose::validate_compose_file;

use super::emit;
use crate::output::OutputFormat;

pub fn cmd_compose(file: &Path, policy: &Policy, format: OutputFormat) -> Result<bool> {
  let result = validate_compose_file(file, policy);
  emit("Compose Validation", &result, format)
}
