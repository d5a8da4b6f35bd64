//! Host port ranges per deployment level.
//!
//! Each level owns a block of host ports so that a suite, its products and
//! their services can run side by side without collisions.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::compose::extract::host_port_number;
use crate::compose::include::parse_manifest;
use crate::deployment::{DeploymentLevel, deployment_config_files, find_compose_file};
use crate::policy::Policy;
use crate::result::ValidationResult;
use crate::util::parse_yaml;

pub const SERVICE_PORTS: RangeInclusive<u32> = 8000..=8999;
pub const PRODUCT_PORTS: RangeInclusive<u32> = 18000..=18999;
pub const SUITE_PORTS: RangeInclusive<u32> = 28000..=28999;

/// Allowed host ports for `level`. Levels without their own block use the service range.
pub fn port_range(level: DeploymentLevel) -> RangeInclusive<u32> {
  match level {
    DeploymentLevel::Product => PRODUCT_PORTS,
    DeploymentLevel::Suite => SUITE_PORTS,
    _ => SERVICE_PORTS,
  }
}

fn range_label(level: DeploymentLevel) -> String {
  let range = port_range(level);
  format!("{} range [{}-{}]", level, range.start(), range.end())
}

/// Check compose host ports and config `bind-public-port` values against the level's range.
pub fn validate_ports(
  deployment_dir: &Path,
  deployment_name: &str,
  level: DeploymentLevel,
  policy: &Policy,
) -> ValidationResult {
  let mut result = ValidationResult::new(deployment_dir);

  if !deployment_dir.exists() {
    result.error(format!("deployment path does not exist: {}", deployment_dir.display()));
    return result;
  }
  if !deployment_dir.is_dir() {
    result.error(format!("{} is not a directory", deployment_dir.display()));
    return result;
  }

  debug!(deployment = deployment_name, level = %level, "checking port ranges");
  check_compose_ports(deployment_dir, level, policy, &mut result);
  check_config_ports(deployment_dir, level, &mut result);
  result
}

fn check_compose_ports(deployment_dir: &Path, level: DeploymentLevel, policy: &Policy, result: &mut ValidationResult) {
  let Some(compose) = find_compose_file(deployment_dir) else {
    return;
  };
  let manifest = match fs::read_to_string(&compose)
    .map_err(|e| e.to_string())
    .and_then(|c| parse_manifest(&c).map_err(|e| e.to_string()))
  {
    Ok(m) => m,
    Err(e) => {
      result.warn(format!("Cannot parse compose file: {}", e));
      return;
    }
  };

  let range = port_range(level);
  for (name, service) in &manifest.services {
    for mapping in service.port_mappings() {
      let Some(port) = host_port_number(&mapping) else {
        continue;
      };
      if is_infrastructure_port(port, policy) || range.contains(&port) {
        continue;
      }
      result.error(format!("service '{}' host port {} outside {}", name, port, range_label(level)));
    }
  }
}

fn is_infrastructure_port(port: u32, policy: &Policy) -> bool {
  u16::try_from(port).is_ok_and(|p| policy.is_infrastructure_port(p))
}

fn check_config_ports(deployment_dir: &Path, level: DeploymentLevel, result: &mut ValidationResult) {
  let range = port_range(level);
  for path in deployment_config_files(deployment_dir) {
    let Ok(content) = fs::read_to_string(&path) else {
      continue;
    };
    let Ok(Value::Mapping(doc)) = parse_yaml(&content) else {
      continue;
    };
    let Some(port) = doc.get("bind-public-port").and_then(Value::as_i64) else {
      continue;
    };
    if u32::try_from(port).is_ok_and(|p| range.contains(&p)) {
      continue;
    }
    let file = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    result.error(format!("config '{}': bind-public-port {} outside {}", file, port, range_label(level)));
  }
}
