//! Policy checks for one service configuration document.
//!
//! A configuration document is a flat YAML mapping of kebab-case keys such as
//! `bind-public-address` or `database-url`. Every check reads the same
//! document and appends to the same result.

use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::result::ValidationResult;
use crate::util::{parse_yaml, yaml_type_name};

pub type ConfigDocument = BTreeMap<String, Value>;

const BIND_ADDRESS_KEYS: &[&str] = &["bind-public-address", "bind-private-address"];
const BIND_PORT_KEYS: &[&str] = &["bind-public-port", "bind-private-port"];
const BIND_PROTOCOL_KEYS: &[&str] = &["bind-public-protocol", "bind-private-protocol"];

const PRIVATE_ADDRESS_KEY: &str = "bind-private-address";
const LOOPBACK: &str = "127.0.0.1";
const REQUIRED_PROTOCOL: &str = "https";
const DATABASE_URL_KEY: &str = "database-url";
const SECRET_FILE_URL_PREFIX: &str = "file:///run/secrets/";

/// Read and check a configuration file.
///
/// A file that cannot be read, does not parse, or is not a mapping fails.
pub fn validate_config_file(path: &Path) -> ValidationResult {
  let mut result = ValidationResult::new(path);

  let content = match fs::read_to_string(path) {
    Ok(c) => c,
    Err(e) => {
      result.error(format!("cannot read config file: {}", e));
      return result;
    }
  };

  match parse_config_document(&content) {
    Ok(doc) => validate_config_document(&doc, &mut result),
    Err(message) => result.error(message),
  }

  debug!(path = %path.display(), valid = result.valid, "config validated");
  result
}

/// Parse a document into its top-level key/value pairs. Non-string keys are dropped.
pub fn parse_config_document(content: &str) -> Result<ConfigDocument, String> {
  let value = parse_yaml(content).map_err(|e| format!("YAML parse error: {}", e))?;
  match value {
    Value::Mapping(map) => Ok(
      map
        .into_iter()
        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
        .collect(),
    ),
    Value::Null => Ok(ConfigDocument::new()),
    other => Err(format!("config must be a YAML mapping, got {}", yaml_type_name(&other))),
  }
}

/// Run every config check against `doc`.
pub fn validate_config_document(doc: &ConfigDocument, result: &mut ValidationResult) {
  check_bind_addresses(doc, result);
  check_bind_ports(doc, result);
  check_bind_protocols(doc, result);
  check_admin_isolation(doc, result);
  check_database_url(doc, result);
  check_otlp(doc, result);
}

fn check_bind_addresses(doc: &ConfigDocument, result: &mut ValidationResult) {
  for key in BIND_ADDRESS_KEYS {
    let Some(value) = doc.get(*key) else {
      continue;
    };
    match value {
      Value::String(addr) => {
        if addr.parse::<IpAddr>().is_err() {
          result.error(format!("'{}' value '{}' is not a valid IP address", key, addr));
        }
      }
      other => result.error(format!("'{}' must be a string, got {}", key, yaml_type_name(other))),
    }
  }
}

/// Integer view of a port value: ints, integral floats and numeric strings.
fn as_port_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn check_bind_ports(doc: &ConfigDocument, result: &mut ValidationResult) {
  for key in BIND_PORT_KEYS {
    let Some(value) = doc.get(*key) else {
      continue;
    };
    match as_port_integer(value) {
      Some(port) if (1..=65535).contains(&port) => {}
      Some(port) => result.error(format!("'{}' value {} outside valid range [1-65535]", key, port)),
      None => result.error(format!("'{}' must be an integer, got {}", key, yaml_type_name(value))),
    }
  }
}

fn check_bind_protocols(doc: &ConfigDocument, result: &mut ValidationResult) {
  for key in BIND_PROTOCOL_KEYS {
    let Some(value) = doc.get(*key) else {
      continue;
    };
    match value {
      Value::String(p) if p == REQUIRED_PROTOCOL => {}
      Value::String(p) => result.error(format!("'{}' must be '{}', got '{}'", key, REQUIRED_PROTOCOL, p)),
      other => result.error(format!("'{}' must be a string, got {}", key, yaml_type_name(other))),
    }
  }
}

/// Admin endpoints bind to loopback only.
fn check_admin_isolation(doc: &ConfigDocument, result: &mut ValidationResult) {
  let Some(Value::String(addr)) = doc.get(PRIVATE_ADDRESS_KEY) else {
    return;
  };
  if addr != LOOPBACK {
    result.error(format!(
      "POLICY VIOLATION: '{}' must be '{}' (admin endpoints must never be exposed), got '{}'",
      PRIVATE_ADDRESS_KEY, LOOPBACK, addr
    ));
  }
}

fn check_database_url(doc: &ConfigDocument, result: &mut ValidationResult) {
  let Some(value) = doc.get(DATABASE_URL_KEY) else {
    return;
  };
  let url = match value {
    Value::String(s) => s,
    Value::Null => return,
    other => {
      result.error(format!("'{}' must be a string, got {}", DATABASE_URL_KEY, yaml_type_name(other)));
      return;
    }
  };
  if url.is_empty() {
    return;
  }

  if url.starts_with("postgres://") || url.starts_with("postgresql://") {
    result.error(format!(
      "'{}' contains inline postgres credentials (use {} reference)",
      DATABASE_URL_KEY, SECRET_FILE_URL_PREFIX
    ));
  } else if !(url.starts_with(SECRET_FILE_URL_PREFIX) || url.starts_with("sqlite://") || url == ":memory:") {
    result.warn(format!("'{}' has unrecognized format: {}", DATABASE_URL_KEY, url));
  }
}

fn is_present(doc: &ConfigDocument, key: &str) -> bool {
  match doc.get(key) {
    None | Some(Value::Null) => false,
    Some(Value::String(s)) => !s.is_empty(),
    Some(_) => true,
  }
}

fn check_otlp(doc: &ConfigDocument, result: &mut ValidationResult) {
  let enabled = match doc.get("otlp") {
    None => return,
    Some(Value::Bool(b)) => *b,
    Some(other) => {
      result.warn(format!("'otlp' must be a boolean, got {}", yaml_type_name(other)));
      return;
    }
  };
  if !enabled {
    return;
  }

  for key in ["otlp-service", "otlp-endpoint"] {
    if !is_present(doc, key) {
      result.error(format!("'{}' is required when 'otlp' is true", key));
    }
  }
}
