//! Secret hygiene for one deployment directory.
//!
//! Three independent scans share one result:
//! - files under `secrets/` are checked for a minimum length when their name
//!   marks them as credential material
//! - YAML documents under `config/` and `configs/` must not carry secret
//!   values inline
//! - the compose file's mapping-form environments must not either

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compose::Environment;
use crate::compose::extract::is_file_reference_key;
use crate::compose::include::parse_manifest;
use crate::consts::{CONFIG_DIRS, SECRET_FILE_SUFFIXES, SECRETS_DIR};
use crate::deployment::find_compose_file;
use crate::policy::Policy;
use crate::result::ValidationResult;
use crate::util::{is_yaml_file, parse_yaml};

/// Substrings of a config key that mark it as holding a secret.
const SECRET_FIELD_MARKERS: &[&str] = &[
  "password",
  "passwd",
  "secret",
  "token",
  "api-key",
  "api_key",
  "private-key",
  "private_key",
  "pepper",
];

/// Audit secrets of the deployment rooted at `deployment_dir`.
pub fn validate_secrets(deployment_dir: &Path, policy: &Policy) -> ValidationResult {
  let mut result = ValidationResult::new(deployment_dir);

  let meta = match fs::metadata(deployment_dir) {
    Ok(m) => m,
    Err(_) => {
      result.error(format!("path not found: {}", deployment_dir.display()));
      return result;
    }
  };
  if !meta.is_dir() {
    result.error(format!("not a directory: {}", deployment_dir.display()));
    return result;
  }

  let secrets_dir = deployment_dir.join(SECRETS_DIR);
  if secrets_dir.is_dir() {
    check_secret_files(&secrets_dir, policy, &mut result);
  }

  for dir in CONFIG_DIRS {
    let config_dir = deployment_dir.join(dir);
    if config_dir.is_dir() {
      check_config_inline_secrets(&config_dir, &mut result);
    }
  }

  if let Some(compose) = find_compose_file(deployment_dir) {
    check_compose_inline_secrets(&compose, &mut result);
  }

  result
}

pub fn is_secret_file(name: &str) -> bool {
  SECRET_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Whether a secret file name denotes credential material rather than an identifier.
pub fn is_high_entropy_secret(name: &str, policy: &Policy) -> bool {
  let lower = name.to_lowercase();
  policy.high_entropy_markers.iter().any(|m| lower.contains(m.as_str()))
}

pub fn is_secret_field_name(key: &str) -> bool {
  let lower = key.to_lowercase();
  SECRET_FIELD_MARKERS.iter().any(|m| lower.contains(m))
}

/// Values that point at a secret instead of containing one.
pub fn is_safe_reference(value: &str) -> bool {
  value.starts_with("file://") || value.starts_with("sqlite://") || value == ":memory:"
}

/// Empty is an error; shorter than the policy minimum is a warning.
pub fn check_secret_length(name: &str, content: &[u8], policy: &Policy, result: &mut ValidationResult) {
  if content.is_empty() {
    result.error(format!("secret file '{}' is empty", name));
  } else if content.len() < policy.min_secret_bytes {
    result.warn(format!(
      "secret file '{}' has {} bytes (minimum recommended: {})",
      name,
      content.len(),
      policy.min_secret_bytes
    ));
  }
}

/// Immediate children of `dir`, sorted by name. The first walk error is returned as text.
fn sorted_children(dir: &Path) -> (Vec<(PathBuf, bool)>, Option<String>) {
  let mut entries = Vec::new();
  for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
    match entry {
      Ok(e) => entries.push((e.path().to_path_buf(), e.file_type().is_dir())),
      Err(e) => return (entries, Some(e.to_string())),
    }
  }
  (entries, None)
}

fn check_secret_files(secrets_dir: &Path, policy: &Policy, result: &mut ValidationResult) {
  let (entries, err) = sorted_children(secrets_dir);
  if let Some(e) = err {
    warn!(path = %secrets_dir.display(), error = %e, "cannot read secrets directory");
    result.warn(format!("cannot read secrets directory: {}", e));
    return;
  }

  for (path, is_dir) in entries {
    if is_dir {
      continue;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
      continue;
    };
    if !is_secret_file(name) || !is_high_entropy_secret(name, policy) {
      continue;
    }

    match fs::read(&path) {
      Ok(content) => check_secret_length(name, &content, policy, result),
      Err(e) => {
        warn!(path = %path.display(), error = %e, "cannot read secret file");
        result.warn(format!("cannot read secret file '{}': {}", name, e));
      }
    }
  }
}

/// Flatten a config document one level deep: `auth: {api-key: x}` gives `auth.api-key`.
fn flatten_one_level(doc: &serde_yaml::Mapping) -> BTreeMap<String, Value> {
  let mut flat = BTreeMap::new();
  for (key, value) in doc {
    let Some(key) = key.as_str() else {
      continue;
    };
    match value {
      Value::Mapping(nested) => {
        for (inner_key, inner_value) in nested {
          if let Some(inner_key) = inner_key.as_str() {
            flat.insert(format!("{}.{}", key, inner_key), inner_value.clone());
          }
        }
      }
      other => {
        flat.insert(key.to_string(), other.clone());
      }
    }
  }
  flat
}

fn check_config_inline_secrets(config_dir: &Path, result: &mut ValidationResult) {
  let (entries, err) = sorted_children(config_dir);
  if let Some(e) = err {
    warn!(path = %config_dir.display(), error = %e, "cannot read configs directory");
    result.warn(format!("cannot read configs directory: {}", e));
    return;
  }

  for (path, is_dir) in entries {
    if is_dir || !is_yaml_file(&path) {
      continue;
    }
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "cannot read config file");
        result.warn(format!("cannot read config file '{}': {}", file_name, e));
        continue;
      }
    };
    let Ok(Value::Mapping(doc)) = parse_yaml(&content) else {
      debug!(path = %path.display(), "skipping config that is not a YAML mapping");
      continue;
    };

    for (key, value) in flatten_one_level(&doc) {
      let Value::String(text) = value else {
        continue;
      };
      if is_secret_field_name(&key) && !text.is_empty() && !is_safe_reference(&text) {
        result.error(format!(
          "config '{}': field '{}' contains inline secret (use file:///run/secrets/ reference)",
          file_name, key
        ));
      }
    }
  }
}

fn check_compose_inline_secrets(compose: &Path, result: &mut ValidationResult) {
  let content = match fs::read_to_string(compose) {
    Ok(c) => c,
    Err(e) => {
      warn!(path = %compose.display(), error = %e, "cannot read compose file");
      result.warn(format!("cannot read compose file: {}", e));
      return;
    }
  };
  let Ok(manifest) = parse_manifest(&content) else {
    debug!(path = %compose.display(), "skipping unparsable compose file");
    return;
  };

  for (name, service) in &manifest.services {
    let Some(Environment::Map(env)) = &service.environment else {
      continue;
    };
    for (key, value) in env {
      let Value::String(text) = value else {
        continue;
      };
      if is_file_reference_key(key) || !is_secret_field_name(key) {
        continue;
      }
      if text.is_empty() || is_safe_reference(text) || text.starts_with("/run/secrets/") {
        continue;
      }
      result.error(format!(
        "compose service '{}': environment '{}' contains inline secret (use Docker secrets)",
        name, key
      ));
    }
  }
}
