//! Include resolution.
//!
//! A root manifest may list other manifests under `include:`. Each listed file
//! is loaded relative to the root's directory and its services and secrets are
//! merged in. Merging is single-level and left-biased: names already present
//! are never overwritten, and the includes of an included file are not followed.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::ComposeError;
use super::types::Manifest;
use crate::util::parse_yaml;

/// Parse one manifest file without following its includes.
///
/// An empty document parses as an empty manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, ComposeError> {
  let content = fs::read_to_string(path).map_err(|source| ComposeError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_manifest(&content).map_err(|source| ComposeError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Parse manifest text.
pub fn parse_manifest(content: &str) -> Result<Manifest, serde_yaml::Error> {
  let value = parse_yaml(content)?;
  if value.is_null() {
    return Ok(Manifest::default());
  }
  serde_yaml::from_value(value)
}

/// Load `path` and merge every manifest it includes.
///
/// Only the root file can fail. Includes that are missing or unparsable are
/// logged and skipped.
pub fn resolve_includes(path: &Path) -> Result<Manifest, ComposeError> {
  let mut manifest = load_manifest(path)?;
  let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

  let include_paths: Vec<String> = manifest
    .includes
    .iter()
    .filter_map(|entry| entry.path().map(str::to_string))
    .collect();

  for include in include_paths {
    let full_path = base_dir.join(&include);
    match load_manifest(&full_path) {
      Ok(included) => {
        debug!(include = %full_path.display(), "merging included manifest");
        merge(&mut manifest, included);
      }
      Err(e) => {
        warn!(include = %full_path.display(), error = %e, "skipping include");
      }
    }
  }

  Ok(manifest)
}

/// Merge `included` into `base`, keeping every entry `base` already has.
pub fn merge(base: &mut Manifest, included: Manifest) {
  if let Some(secrets) = included.secrets {
    let target = base.secrets.get_or_insert_with(Default::default);
    for (name, decl) in secrets {
      target.entry(name).or_insert(decl);
    }
  }

  for (name, service) in included.services {
    base.services.entry(name).or_insert(service);
  }
}
