//! Structural mirror between a deployments root and a configs root.
//!
//! Every deployment directory must have a config directory named after its
//! product. Several deployments may share one config directory. Config
//! directories that no deployment maps to are reported as orphans, which is
//! advisory only.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Deployments whose product name differs from their config directory.
const EXPLICIT_MAPPINGS: &[(&str, &str)] = &[("pki", "ca"), ("pki-ca", "ca"), ("sm", "sm"), ("sm-kms", "sm")];

/// Deployment names with no config counterpart.
const EXCLUDED_DEPLOYMENTS: &[&str] = &["archived", "template"];
const EXCLUDED_PREFIX: &str = "shared-";

#[derive(Debug, Error)]
pub enum MirrorError {
  #[error("failed to list deployment directories in {}: {source}", path.display())]
  Deployments { path: PathBuf, source: walkdir::Error },

  #[error("failed to list config directories in {}: {source}", path.display())]
  Configs { path: PathBuf, source: walkdir::Error },
}

/// Outcome of [`validate_structural_mirror`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorResult {
  pub valid: bool,
  /// Deployment names without a config directory.
  pub missing_mirrors: Vec<String>,
  /// Config directory names no deployment maps to.
  pub orphans: Vec<String>,
  pub excluded: Vec<String>,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl Default for MirrorResult {
  fn default() -> Self {
    Self {
      valid: true,
      missing_mirrors: Vec::new(),
      orphans: Vec::new(),
      excluded: Vec::new(),
      errors: Vec::new(),
      warnings: Vec::new(),
    }
  }
}

impl MirrorResult {
  /// A failed result carrying a single error, for when listing failed.
  pub fn failed(message: impl Into<String>) -> Self {
    Self {
      valid: false,
      errors: vec![message.into()],
      ..Default::default()
    }
  }
}

/// Config directory name for a deployment: an explicit mapping, else the
/// first `-`-separated segment.
pub fn map_deployment_to_config(deployment: &str) -> &str {
  if let Some((_, config)) = EXPLICIT_MAPPINGS.iter().find(|(d, _)| *d == deployment) {
    return config;
  }
  deployment.split('-').next().unwrap_or(deployment)
}

pub fn is_excluded_deployment(name: &str) -> bool {
  name.starts_with(EXCLUDED_PREFIX) || EXCLUDED_DEPLOYMENTS.contains(&name)
}

/// Immediate sub-directory names of `dir`, sorted.
fn list_subdirectories(dir: &Path) -> Result<Vec<String>, walkdir::Error> {
  let mut names = Vec::new();
  for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = entry?;
    if entry.file_type().is_dir() {
      names.push(entry.file_name().to_string_lossy().into_owned());
    }
  }
  Ok(names)
}

/// Check that every deployment under `deployments_dir` has its config
/// directory under `configs_dir`.
///
/// Fails only when either root cannot be listed.
pub fn validate_structural_mirror(deployments_dir: &Path, configs_dir: &Path) -> Result<MirrorResult, MirrorError> {
  let deployments = list_subdirectories(deployments_dir).map_err(|source| MirrorError::Deployments {
    path: deployments_dir.to_path_buf(),
    source,
  })?;
  let configs = list_subdirectories(configs_dir).map_err(|source| MirrorError::Configs {
    path: configs_dir.to_path_buf(),
    source,
  })?;
  let available: BTreeSet<&str> = configs.iter().map(String::as_str).collect();

  let mut result = MirrorResult::default();
  // Excluded names count as matched so a same-named config dir is not an orphan.
  let mut matched: BTreeSet<&str> = BTreeSet::new();

  for name in &deployments {
    if is_excluded_deployment(name) {
      result.excluded.push(name.clone());
      matched.insert(name);
      continue;
    }
    let config = map_deployment_to_config(name);
    debug!(deployment = %name, config = %config, "mirror mapping");
    matched.insert(config);
    if !available.contains(config) {
      result.missing_mirrors.push(name.clone());
      result.errors.push(format!(
        "deployment '{}' has no config directory '{}' under {}",
        name,
        config,
        configs_dir.display()
      ));
      result.valid = false;
    }
  }

  for config in &configs {
    if !matched.contains(config.as_str()) {
      result.orphans.push(config.clone());
      result
        .warnings
        .push(format!("orphaned config directory '{}' has no matching deployment", config));
    }
  }

  Ok(result)
}
