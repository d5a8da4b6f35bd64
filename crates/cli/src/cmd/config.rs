//! Implementation of the `deplint config` command.
//!
//! Each argument is either a config file or a directory searched recursively
//! for YAML files. Every file gets its own result.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;

use deplint_lib::deployment::discover_config_files;
use deplint_lib::service_config::validate_config_file;

use crate::output::{OutputFormat, print_json, print_result};

fn expand(paths: &[PathBuf]) -> Vec<PathBuf> {
  let mut files = Vec::new();
  for path in paths {
    if path.is_dir() {
      let found = discover_config_files(path);
      debug!(dir = %path.display(), count = found.len(), "expanded config directory");
      files.extend(found);
    } else {
      files.push(path.clone());
    }
  }
  files
}

pub fn cmd_config(paths: &[PathBuf], format: OutputFormat) -> Result<bool> {
  let files = expand(paths);
  if files.is_empty() {
    bail!("No config files found under {}", display_list(paths));
  }

  let results: Vec<_> = files.iter().map(|f| validate_config_file(f)).collect();

  if format.is_json() {
    print_json(&results)?;
  } else {
    for result in &results {
      print_result("Config Validation", result);
    }
  }

  Ok(results.iter().all(|r| r.valid))
}

fn display_list(paths: &[PathBuf]) -> String {
  paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
