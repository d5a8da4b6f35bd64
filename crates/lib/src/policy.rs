//! Policy data consumed by the validators.
//!
//! Exemption lists, allow lists, dangerous paths and the credential key
//! pattern are data, not logic. [`Policy::default`] carries the built-in
//! values; [`Policy::load`] overlays a YAML file on top of them, field by
//! field.
//!
//! # Policy File Format
//!
//! ```yaml
//! healthcheck-exempt-prefixes: [builder-, setup-]
//! infrastructure-services: [grafana-otel-lgtm]
//! min-secret-bytes: 48
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::POLICY_ENV_VAR;

/// Keys ending in one of these words (optionally behind a `PREFIX_`) hold credentials.
pub const DEFAULT_CREDENTIAL_KEY_PATTERN: &str = r"(?i)^(.*_)?(PASSWORD|PASSWD|SECRET|TOKEN|API_KEY|PRIVATE_KEY)$";

static DEFAULT_CREDENTIAL_KEY_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(DEFAULT_CREDENTIAL_KEY_PATTERN).expect("built-in credential pattern compiles"));

const DEFAULT_EXEMPT_PREFIXES: &[&str] = &["builder-", "healthcheck-", "setup-", "init-"];
const DEFAULT_EXEMPT_SUFFIXES: &[&str] = &["-setup", "-init"];
const DEFAULT_ENTRYPOINT_MARKER: &str = "echo";

const DEFAULT_INFRASTRUCTURE_SERVICES: &[&str] = &[
  "grafana-otel-lgtm",
  "opentelemetry-collector-contrib",
  "healthcheck-opentelemetry-collector-contrib",
];

const DEFAULT_DANGEROUS_MOUNTS: &[&str] = &["/var/run/docker.sock", "/run/docker.sock", "/etc/shadow", "/etc/passwd"];

const DEFAULT_HIGH_ENTROPY_MARKERS: &[&str] = &[
  "password",
  "passwd",
  "pepper",
  "private_key",
  "private-key",
  "api_key",
  "api-key",
  "secret_key",
  "unseal",
  "token",
];

/// Postgres, Grafana, OTLP gRPC/HTTP, collector health and the forwarded OTLP ports.
const DEFAULT_INFRASTRUCTURE_PORTS: &[u16] = &[3000, 4317, 4318, 5432, 13133, 14317, 14318];

pub const DEFAULT_MIN_SECRET_BYTES: usize = 32;

/// Errors that can occur when loading a policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
  #[error("failed to read policy file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse policy file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },

  #[error("invalid credential-key-pattern '{pattern}': {source}")]
  Pattern { pattern: String, source: regex::Error },
}

/// Static configuration for every validator.
#[derive(Debug, Clone)]
pub struct Policy {
  pub healthcheck_exempt_prefixes: Vec<String>,
  pub healthcheck_exempt_suffixes: Vec<String>,
  /// A service whose entrypoint text contains this marker is treated as a one-shot job.
  pub healthcheck_exempt_entrypoint_marker: String,
  /// Services skipped entirely by the hardcoded-credential check.
  pub infrastructure_services: Vec<String>,
  pub dangerous_mounts: Vec<String>,
  pub credential_key_pattern: Regex,
  /// Filename fragments that mark a secret file as credential material.
  pub high_entropy_markers: Vec<String>,
  pub min_secret_bytes: usize,
  /// Host ports owned by shared infrastructure, exempt from range checks.
  pub infrastructure_ports: Vec<u16>,
}

/// On-disk shape of a policy file. Absent fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PolicyFile {
  healthcheck_exempt_prefixes: Option<Vec<String>>,
  healthcheck_exempt_suffixes: Option<Vec<String>>,
  healthcheck_exempt_entrypoint_marker: Option<String>,
  infrastructure_services: Option<Vec<String>>,
  dangerous_mounts: Option<Vec<String>>,
  credential_key_pattern: Option<String>,
  high_entropy_markers: Option<Vec<String>>,
  min_secret_bytes: Option<usize>,
  infrastructure_ports: Option<Vec<u16>>,
}

fn owned(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

impl Default for Policy {
  fn default() -> Self {
    Self {
      healthcheck_exempt_prefixes: owned(DEFAULT_EXEMPT_PREFIXES),
      healthcheck_exempt_suffixes: owned(DEFAULT_EXEMPT_SUFFIXES),
      healthcheck_exempt_entrypoint_marker: DEFAULT_ENTRYPOINT_MARKER.to_string(),
      infrastructure_services: owned(DEFAULT_INFRASTRUCTURE_SERVICES),
      dangerous_mounts: owned(DEFAULT_DANGEROUS_MOUNTS),
      credential_key_pattern: DEFAULT_CREDENTIAL_KEY_RE.clone(),
      high_entropy_markers: owned(DEFAULT_HIGH_ENTROPY_MARKERS),
      min_secret_bytes: DEFAULT_MIN_SECRET_BYTES,
      infrastructure_ports: DEFAULT_INFRASTRUCTURE_PORTS.to_vec(),
    }
  }
}

impl Policy {
  /// Load a policy file, overlaying its fields on the built-in defaults.
  pub fn load(path: &Path) -> Result<Self, PolicyError> {
    let content = fs::read_to_string(path).map_err(|source| PolicyError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_yaml(&content).map_err(|e| match e {
      PolicyError::Parse { source, .. } => PolicyError::Parse {
        path: path.to_path_buf(),
        source,
      },
      other => other,
    })
  }

  /// Parse policy overrides from YAML text.
  pub fn from_yaml(content: &str) -> Result<Self, PolicyError> {
    let file: PolicyFile = if content.trim().is_empty() {
      PolicyFile::default()
    } else {
      serde_yaml::from_str(content).map_err(|source| PolicyError::Parse {
        path: PathBuf::new(),
        source,
      })?
    };

    let mut policy = Self::default();
    if let Some(v) = file.healthcheck_exempt_prefixes {
      policy.healthcheck_exempt_prefixes = v;
    }
    if let Some(v) = file.healthcheck_exempt_suffixes {
      policy.healthcheck_exempt_suffixes = v;
    }
    if let Some(v) = file.healthcheck_exempt_entrypoint_marker {
      policy.healthcheck_exempt_entrypoint_marker = v;
    }
    if let Some(v) = file.infrastructure_services {
      policy.infrastructure_services = v;
    }
    if let Some(v) = file.dangerous_mounts {
      policy.dangerous_mounts = v;
    }
    if let Some(pattern) = file.credential_key_pattern {
      policy.credential_key_pattern = Regex::new(&pattern).map_err(|source| PolicyError::Pattern {
        pattern: pattern.clone(),
        source,
      })?;
    }
    if let Some(v) = file.high_entropy_markers {
      policy.high_entropy_markers = v;
    }
    if let Some(v) = file.min_secret_bytes {
      policy.min_secret_bytes = v;
    }
    if let Some(v) = file.infrastructure_ports {
      policy.infrastructure_ports = v;
    }

    Ok(policy)
  }

  /// Resolve the active policy: an explicit path, else `DEPLINT_POLICY`, else the defaults.
  pub fn resolve(explicit: Option<&Path>) -> Result<Self, PolicyError> {
    if let Some(path) = explicit {
      debug!(path = %path.display(), "loading policy from flag");
      return Self::load(path);
    }

    match std::env::var_os(POLICY_ENV_VAR) {
      Some(value) if !value.is_empty() => {
        let path = PathBuf::from(value);
        debug!(path = %path.display(), "loading policy from environment");
        Self::load(&path)
      }
      _ => Ok(Self::default()),
    }
  }

  pub fn is_infrastructure_service(&self, name: &str) -> bool {
    self.infrastructure_services.iter().any(|s| s == name)
  }

  pub fn is_infrastructure_port(&self, port: u16) -> bool {
    self.infrastructure_ports.contains(&port)
  }
}
