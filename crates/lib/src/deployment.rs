//! Deployment tree layout: levels, discovery and required contents.
//!
//! A deployments root holds one directory per deployment unit. Its name decides
//! its level in the SUITE → PRODUCT → SERVICE hierarchy, and the level decides
//! which directories, files and secrets it must ship.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::consts::{COMPOSE_FILE_NAMES, CONFIG_DIRS, DOCKERFILE, REQUIRED_SERVICE_SECRETS, SECRETS_DIR};
use crate::util::is_yaml_file;

const KNOWN_PRODUCTS: &[&str] = &["identity", "jose", "pki", "sm", "cipher"];
const KNOWN_SUITES: &[&str] = &["cryptoutil", "cryptoutil-suite"];

#[derive(Debug, Error)]
pub enum DeploymentError {
  #[error(
    "unknown deployment level '{0}' (expected PRODUCT-SERVICE, PRODUCT, SUITE, infrastructure or template)"
  )]
  UnknownLevel(String),
}

/// Position of a deployment unit in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DeploymentLevel {
  #[serde(rename = "PRODUCT-SERVICE")]
  ProductService,
  #[serde(rename = "PRODUCT")]
  Product,
  #[serde(rename = "SUITE")]
  Suite,
  #[serde(rename = "infrastructure")]
  Infrastructure,
  #[serde(rename = "template")]
  Template,
}

impl DeploymentLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      DeploymentLevel::ProductService => "PRODUCT-SERVICE",
      DeploymentLevel::Product => "PRODUCT",
      DeploymentLevel::Suite => "SUITE",
      DeploymentLevel::Infrastructure => "infrastructure",
      DeploymentLevel::Template => "template",
    }
  }
}

impl fmt::Display for DeploymentLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DeploymentLevel {
  type Err = DeploymentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "PRODUCT-SERVICE" => Ok(DeploymentLevel::ProductService),
      "PRODUCT" => Ok(DeploymentLevel::Product),
      "SUITE" => Ok(DeploymentLevel::Suite),
      "infrastructure" => Ok(DeploymentLevel::Infrastructure),
      "template" => Ok(DeploymentLevel::Template),
      other => Err(DeploymentError::UnknownLevel(other.to_string())),
    }
  }
}

/// Level implied by a deployment directory name.
pub fn classify_deployment(name: &str) -> DeploymentLevel {
  if name == "template" {
    return DeploymentLevel::Template;
  }
  if name.starts_with("shared-") || name == "compose" {
    return DeploymentLevel::Infrastructure;
  }
  if KNOWN_SUITES.contains(&name) {
    return DeploymentLevel::Suite;
  }
  if name.contains('-') {
    return DeploymentLevel::ProductService;
  }
  if KNOWN_PRODUCTS.contains(&name) {
    return DeploymentLevel::Product;
  }
  DeploymentLevel::Infrastructure
}

/// One discovered deployment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
  pub name: String,
  pub path: PathBuf,
  pub level: DeploymentLevel,
}

/// Immediate sub-directories of `root`, sorted by name and classified.
///
/// A missing or unreadable root yields an empty list.
pub fn discover_deployments(root: &Path) -> Vec<Deployment> {
  let mut deployments = Vec::new();
  for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = match entry {
      Ok(e) => e,
      Err(e) => {
        warn!(root = %root.display(), error = %e, "cannot list deployments");
        break;
      }
    };
    if !entry.file_type().is_dir() {
      continue;
    }
    let name = entry.file_name().to_string_lossy().into_owned();
    let level = classify_deployment(&name);
    debug!(name = %name, level = %level, "discovered deployment");
    deployments.push(Deployment {
      name,
      path: entry.into_path(),
      level,
    });
  }
  deployments
}

/// First compose file present in `dir`, by priority.
pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
  COMPOSE_FILE_NAMES.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

/// Every YAML file below `dir`, recursively, in sorted order.
pub fn discover_config_files(dir: &Path) -> Vec<PathBuf> {
  WalkDir::new(dir)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file() && is_yaml_file(e.path()))
    .map(|e| e.into_path())
    .collect()
}

/// YAML files directly inside a deployment's `config/` and `configs/` directories.
pub fn deployment_config_files(deployment_dir: &Path) -> Vec<PathBuf> {
  CONFIG_DIRS
    .iter()
    .flat_map(|dir| {
      WalkDir::new(deployment_dir.join(dir))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_yaml_file(e.path()))
        .map(|e| e.into_path())
    })
    .collect()
}

/// Outcome of the required-contents check for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureResult {
  pub path: PathBuf,
  pub level: DeploymentLevel,
  pub valid: bool,
  pub missing_dirs: Vec<String>,
  pub missing_files: Vec<String>,
  pub missing_secrets: Vec<String>,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl StructureResult {
  pub fn new(path: impl Into<PathBuf>, level: DeploymentLevel) -> Self {
    Self {
      path: path.into(),
      level,
      valid: true,
      missing_dirs: Vec::new(),
      missing_files: Vec::new(),
      missing_secrets: Vec::new(),
      errors: Vec::new(),
      warnings: Vec::new(),
    }
  }

  pub fn error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
    self.valid = false;
  }

  pub fn warn(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
  }
}

/// What a deployment of a given level must contain.
struct Requirements {
  dirs: &'static [&'static str],
  files: &'static [&'static str],
  secrets: &'static [&'static str],
}

fn requirements(level: DeploymentLevel) -> Requirements {
  match level {
    DeploymentLevel::ProductService => Requirements {
      dirs: &[SECRETS_DIR, "config"],
      files: &["compose.yml", DOCKERFILE],
      secrets: REQUIRED_SERVICE_SECRETS,
    },
    DeploymentLevel::Template => Requirements {
      dirs: &[SECRETS_DIR],
      files: &["compose.yml"],
      secrets: REQUIRED_SERVICE_SECRETS,
    },
    DeploymentLevel::Product | DeploymentLevel::Suite => Requirements {
      dirs: &[SECRETS_DIR],
      files: &["compose.yml"],
      secrets: &[],
    },
    DeploymentLevel::Infrastructure => Requirements {
      dirs: &[],
      files: &["compose.yml"],
      secrets: &[],
    },
  }
}

/// Check that `dir` holds everything its level requires.
///
/// A secret counts as present under its bare name or prefixed with
/// `<name>-`. Secrets are only looked for when `secrets/` exists.
pub fn validate_structure(dir: &Path, name: &str, level: DeploymentLevel) -> StructureResult {
  let mut result = StructureResult::new(dir, level);

  if !dir.exists() {
    result.error(format!("deployment directory does not exist: {}", dir.display()));
    return result;
  }
  if !dir.is_dir() {
    result.error(format!("{} is not a directory", dir.display()));
    return result;
  }

  let req = requirements(level);

  for required in req.dirs {
    if !dir.join(required).is_dir() {
      result.missing_dirs.push(required.to_string());
    }
  }
  for required in req.files {
    if !dir.join(required).is_file() {
      result.missing_files.push(required.to_string());
    }
  }

  let secrets_dir = dir.join(SECRETS_DIR);
  if secrets_dir.is_dir() {
    for secret in req.secrets {
      let bare = secrets_dir.join(secret);
      let prefixed = secrets_dir.join(format!("{}-{}", name, secret));
      if !bare.is_file() && !prefixed.is_file() {
        result.missing_secrets.push(secret.to_string());
      }
    }
  }

  if !result.missing_dirs.is_empty() || !result.missing_files.is_empty() || !result.missing_secrets.is_empty() {
    result.valid = false;
  }

  result
}
