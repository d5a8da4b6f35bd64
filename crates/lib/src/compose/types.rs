//! Compose manifest model.
//!
//! This module defines the typed view of a compose-style document:
//! - [`Manifest`] - services, top-level secrets and include directives
//! - [`Service`] - one workload definition
//! - [`Environment`], [`DependsOn`], [`SecretRef`] - fields that accept more than one YAML shape
//!
//! Fields the validators never read (`build`, `deploy`, `networks`, ...) are kept
//! as opaque [`Value`]s so that unusual shapes never cause a parse failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, de};
use serde_yaml::{Mapping, Value};

use crate::util::{scalar_to_string, yaml_type_name};

/// Deserialize `null` (or an absent field) as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize any scalar as text, so `image: 3` or `interval: 30` never fails the document.
///
/// `null` is treated as absent; sequences and mappings are rejected.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(value) => scalar_to_string(&value)
      .map(Some)
      .ok_or_else(|| de::Error::custom(format!("expected a scalar, got {}", yaml_type_name(&value)))),
  }
}

/// A parsed compose document.
///
/// Services are stored in a [`BTreeMap`], so iteration is always in
/// lexicographic name order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawManifest")]
pub struct Manifest {
  pub includes: Vec<IncludeEntry>,
  pub services: BTreeMap<String, Service>,
  /// `None` when the document has no `secrets:` section at all.
  pub secrets: Option<BTreeMap<String, SecretDecl>>,
  pub networks: Option<Value>,
  pub volumes: Option<Value>,
}

/// Serde shape of a manifest. Service and secret bodies may be `null`.
#[derive(Deserialize)]
struct RawManifest {
  #[serde(default, rename = "include", deserialize_with = "null_as_default")]
  includes: Vec<IncludeEntry>,
  #[serde(default, deserialize_with = "null_as_default")]
  services: BTreeMap<String, Option<Service>>,
  #[serde(default)]
  secrets: Option<BTreeMap<String, Option<SecretDecl>>>,
  #[serde(default)]
  networks: Option<Value>,
  #[serde(default)]
  volumes: Option<Value>,
}

impl From<RawManifest> for Manifest {
  fn from(raw: RawManifest) -> Self {
    Self {
      includes: raw.includes,
      services: raw
        .services
        .into_iter()
        .map(|(name, svc)| (name, svc.unwrap_or_default()))
        .collect(),
      secrets: raw.secrets.map(|secrets| {
        secrets
          .into_iter()
          .map(|(name, decl)| (name, decl.unwrap_or_default()))
          .collect()
      }),
      networks: raw.networks,
      volumes: raw.volumes,
    }
  }
}

impl Manifest {
  pub fn has_service(&self, name: &str) -> bool {
    self.services.contains_key(name)
  }
}

/// One entry of the top-level `include:` list.
///
/// Accepts both the short form (`- other.yml`) and the long form
/// (`- path: other.yml`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IncludeEntry {
  Path(String),
  Record {
    #[serde(default)]
    path: Option<Value>,
  },
}

impl IncludeEntry {
  /// The include path, if it is a single non-empty string.
  pub fn path(&self) -> Option<&str> {
    let path = match self {
      IncludeEntry::Path(p) => p.as_str(),
      IncludeEntry::Record { path: Some(Value::String(p)) } => p.as_str(),
      IncludeEntry::Record { .. } => return None,
    };
    if path.is_empty() { None } else { Some(path) }
  }
}

/// A top-level secret declaration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SecretDecl {
  #[serde(default, deserialize_with = "lenient_string")]
  pub file: Option<String>,
  /// `true`, or a legacy `{name: ...}` record.
  #[serde(default)]
  pub external: Option<Value>,
}

/// One service definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Service {
  #[serde(default, deserialize_with = "lenient_string")]
  pub image: Option<String>,
  #[serde(default)]
  pub build: Option<Value>,
  #[serde(default)]
  pub command: Option<Value>,
  #[serde(default)]
  pub entrypoint: Option<Value>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub working_dir: Option<String>,
  #[serde(default)]
  pub shm_size: Option<Value>,
  /// Raw port mappings: `"container"`, `"host:container"` or `"ip:host:container"`.
  #[serde(default, deserialize_with = "null_as_default")]
  pub ports: Vec<Value>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub volumes: Vec<Value>,
  #[serde(default)]
  pub environment: Option<Environment>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub secrets: Vec<SecretRef>,
  #[serde(default)]
  pub depends_on: Option<DependsOn>,
  /// Absence is significant: `None` means no health check was declared.
  #[serde(default)]
  pub healthcheck: Option<Healthcheck>,
  #[serde(default)]
  pub networks: Option<Value>,
  #[serde(default)]
  pub deploy: Option<Value>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub profiles: Vec<Value>,
}

impl Service {
  /// Port mappings as strings. Long-syntax records become `published:target`.
  pub fn port_mappings(&self) -> Vec<String> {
    self
      .ports
      .iter()
      .filter_map(|entry| match entry {
        Value::Mapping(m) => {
          let target = m.get("target").and_then(scalar_text)?;
          match m.get("published").and_then(scalar_text) {
            Some(published) => Some(format!("{}:{}", published, target)),
            None => Some(target),
          }
        }
        other => scalar_text(other),
      })
      .collect()
  }

  /// Volume specs as strings. Long-syntax records become `source:target`.
  pub fn volume_specs(&self) -> Vec<String> {
    self
      .volumes
      .iter()
      .filter_map(|entry| match entry {
        Value::Mapping(m) => {
          let source = m.get("source").and_then(scalar_text).unwrap_or_default();
          let target = m.get("target").and_then(scalar_text).unwrap_or_default();
          Some(format!("{}:{}", source, target))
        }
        other => scalar_text(other),
      })
      .collect()
  }

  /// Entrypoint as one line of text; list forms are joined with spaces.
  pub fn entrypoint_text(&self) -> Option<String> {
    match self.entrypoint.as_ref()? {
      Value::Sequence(items) => Some(items.iter().filter_map(scalar_text).collect::<Vec<_>>().join(" ")),
      other => scalar_text(other),
    }
  }
}

/// Scalar as text; nulls are skipped rather than rendered empty.
fn scalar_text(value: &Value) -> Option<String> {
  if value.is_null() { None } else { scalar_to_string(value) }
}

/// Service health check. Only its presence matters to the validators.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Healthcheck {
  #[serde(default)]
  pub test: Option<Value>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub interval: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub timeout: Option<String>,
  #[serde(default)]
  pub retries: Option<Value>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub start_period: Option<String>,
  #[serde(default)]
  pub disable: Option<Value>,
}

/// `environment:` in mapping form or `KEY=VALUE` list form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Environment {
  Map(BTreeMap<String, Value>),
  List(Vec<Value>),
  Other(Value),
}

/// `depends_on:` as a list of names or a mapping of name to condition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
  List(Vec<Value>),
  Map(Mapping),
  Other(Value),
}

/// A service's reference to a top-level secret.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SecretRef {
  /// `- db_password`
  Name(String),
  /// `- source: db_password` with optional `target`, `mode`, ...
  Long(Mapping),
  Other(Value),
}
