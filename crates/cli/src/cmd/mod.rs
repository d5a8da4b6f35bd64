mod all;
mod compose;
mod config;
mod ports;
mod secrets;
mod structure;

use std::path::Path;

use anyhow::{Context, Result};

use deplint_lib::ValidationResult;
use deplint_lib::deployment::{DeploymentLevel, classify_deployment};

use crate::output::{OutputFormat, print_json, print_result};

pub use all::cmd_all;
pub use compose::cmd_compose;
pub use config::cmd_config;
pub use ports::cmd_ports;
pub use secrets::cmd_secrets;
pub use structure::cmd_structure;

/// Name and level of a deployment directory, defaulting from its (canonical) name.
fn deployment_identity(
  dir: &Path,
  name: Option<String>,
  level: Option<DeploymentLevel>,
) -> Result<(String, DeploymentLevel)> {
  let name = match name {
    Some(n) => n,
    None => {
      let resolved = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
      resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot derive a deployment name from {}; pass --name", dir.display()))?
    }
  };
  let level = level.unwrap_or_else(|| classify_deployment(&name));
  Ok((name, level))
}

/// Emit one result in the selected format and return its verdict.
fn emit(title: &str, result: &ValidationResult, format: OutputFormat) -> Result<bool> {
  if format.is_json() {
    print_json(result)?;
  } else {
    print_result(title, result);
  }
  Ok(result.valid)
}
