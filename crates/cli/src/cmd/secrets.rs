//! Implementation of the `deplint secrets` command.

use std::path::Path;

use anyhow::Result;

use deplint_lib::Policy;
use deplint_lib::secrets::validate_secrets;

use super::emit;
use crate::output::OutputFormat;

pub fn cmd_secrets(dir: &Path, policy: &Policy, format: OutputFormat) -> Result<bool> {
  let result = validate_secrets(dir, policy);
  emit("Secrets Validation", &result, format)
}
