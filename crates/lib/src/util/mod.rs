//! Shared utilities.
//!
//! Small YAML helpers used by more than one validator, plus test fixtures.

use std::path::Path;

use serde_yaml::Value;

use crate::consts::YAML_EXTENSIONS;

/// Human-readable name of a YAML value's type, for diagnostics.
pub fn yaml_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(n) if n.is_f64() => "float",
    Value::Number(_) => "int",
    Value::String(_) => "str",
    Value::Sequence(_) => "list",
    Value::Mapping(_) => "dict",
    Value::Tagged(_) => "tagged",
  }
}

/// Render a scalar YAML value as text. Compound values yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::Null => Some(String::new()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.clone()),
    _ => None,
  }
}

/// Parse YAML text into a [`Value`] with `<<` merge keys applied.
///
/// Compose files commonly share blocks through `x-` anchors and `<<: *anchor`;
/// without merging, inherited keys would be invisible to every check.
pub fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
  let mut value: Value = serde_yaml::from_str(content)?;
  value.apply_merge()?;
  Ok(value)
}

/// True when `path` has a `.yml` or `.yaml` extension.
pub fn is_yaml_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|ext| YAML_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
pub mod testutil;
