//! Field extractors.
//!
//! Pure functions that turn the multi-shape fields of [`Service`] into one
//! canonical form. Validators only ever read these outputs.

use std::collections::BTreeMap;

use serde_yaml::Value;

use super::types::{DependsOn, Environment, SecretRef, Service};
use crate::util::scalar_to_string;

/// Host-port component of a port mapping.
///
/// `"8080"` has none, `"8080:80"` yields `"8080"`, `"127.0.0.1:8080:80"`
/// yields `"127.0.0.1:8080"`. Any other shape yields `None`.
pub fn host_port(mapping: &str) -> Option<String> {
  let mapping = mapping.trim_matches(|c| c == '"' || c == '\'');
  let parts: Vec<&str> = mapping.split(':').collect();
  match parts.as_slice() {
    [host, _container] => Some(host.to_string()),
    [ip, host, _container] => Some(format!("{}:{}", ip, host)),
    _ => None,
  }
}

/// Numeric host port of a mapping, with any `ip:` prefix dropped.
pub fn host_port_number(mapping: &str) -> Option<u32> {
  let mapping = mapping.trim_matches(|c| c == '"' || c == '\'');
  let parts: Vec<&str> = mapping.split(':').collect();
  let host = match parts.as_slice() {
    [host, _container] => host,
    [_ip, host, _container] => host,
    _ => return None,
  };
  host.parse().ok()
}

/// Environment variables of a service as a key/value map.
///
/// Mapping values are rendered as text (`null` becomes `""`). List items are
/// split on the first `=`; a bare `KEY` maps to `""`. Non-string list items are
/// ignored.
pub fn environment(service: &Service) -> BTreeMap<String, String> {
  let mut vars = BTreeMap::new();
  match &service.environment {
    Some(Environment::Map(map)) => {
      for (key, value) in map {
        vars.insert(key.clone(), value_text(value));
      }
    }
    Some(Environment::List(items)) => {
      for item in items {
        if let Value::String(entry) = item {
          match entry.split_once('=') {
            Some((key, value)) => vars.insert(key.to_string(), value.to_string()),
            None => vars.insert(entry.clone(), String::new()),
          };
        }
      }
    }
    Some(Environment::Other(_)) | None => {}
  }
  vars
}

fn value_text(value: &Value) -> String {
  scalar_to_string(value).unwrap_or_else(|| {
    serde_yaml::to_string(value)
      .map(|s| s.trim_end().to_string())
      .unwrap_or_default()
  })
}

/// Names of the services this service depends on, sorted.
pub fn dependencies(service: &Service) -> Vec<String> {
  let mut deps: Vec<String> = match &service.depends_on {
    Some(DependsOn::List(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
    Some(DependsOn::Map(map)) => map.keys().filter_map(|k| k.as_str().map(str::to_string)).collect(),
    Some(DependsOn::Other(_)) | None => Vec::new(),
  };
  deps.sort();
  deps
}

/// Secret name of a reference. Unrecognized shapes yield `""`.
pub fn secret_name(reference: &SecretRef) -> &str {
  match reference {
    SecretRef::Name(name) => name,
    SecretRef::Long(map) => map.get("source").and_then(Value::as_str).unwrap_or(""),
    SecretRef::Other(_) => "",
  }
}

/// `*_FILE` variables name a mounted secret file, never the secret itself.
pub fn is_file_reference_key(key: &str) -> bool {
  key.to_ascii_uppercase().ends_with("_FILE")
}
