//! Structural and security checks over a merged manifest.
//!
//! Each check only appends to the result it is given and walks services in
//! lexicographic name order, so messages come out in a stable order.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::extract;
use super::include::resolve_includes;
use super::types::{Manifest, Service};
use crate::policy::Policy;
use crate::result::ValidationResult;

/// Validate one compose file, following its includes.
///
/// A root that cannot be read or parsed yields a failed result carrying a
/// `YAML parse error` message. A manifest without services fails with a
/// single error and no further checks run.
pub fn validate_compose_file(path: &Path, policy: &Policy) -> ValidationResult {
  let mut result = ValidationResult::new(path);

  let manifest = match resolve_includes(path) {
    Ok(m) => m,
    Err(e) => {
      result.error(format!("YAML parse error: {}", e));
      return result;
    }
  };

  validate_manifest(&manifest, policy, &mut result);
  debug!(path = %path.display(), errors = result.errors.len(), warnings = result.warnings.len(), "compose validated");
  result
}

/// Run every check against an already merged manifest.
pub fn validate_manifest(manifest: &Manifest, policy: &Policy, result: &mut ValidationResult) {
  if manifest.services.is_empty() {
    result.error("no services defined in compose file");
    return;
  }

  check_port_conflicts(manifest, result);
  check_healthchecks(manifest, policy, result);
  check_dependencies(manifest, result);
  check_secret_references(manifest, result);
  check_hardcoded_credentials(manifest, policy, result);
  check_bind_mounts(manifest, policy, result);
}

/// Two services claiming the same host port (including any bind IP) conflict.
pub fn check_port_conflicts(manifest: &Manifest, result: &mut ValidationResult) {
  let mut claimed: BTreeMap<String, &str> = BTreeMap::new();

  for (name, service) in &manifest.services {
    for mapping in service.port_mappings() {
      let Some(host) = extract::host_port(&mapping) else {
        continue;
      };
      match claimed.get(&host) {
        Some(owner) => result.error(format!(
          "port conflict: host port {} used by both '{}' and '{}'",
          host, owner, name
        )),
        None => {
          claimed.insert(host, name);
        }
      }
    }
  }
}

/// True for one-shot services that need no health check.
pub fn is_healthcheck_exempt(name: &str, service: &Service, policy: &Policy) -> bool {
  if policy.healthcheck_exempt_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
    return true;
  }
  if policy.healthcheck_exempt_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
    return true;
  }
  service
    .entrypoint_text()
    .is_some_and(|text| text.contains(policy.healthcheck_exempt_entrypoint_marker.as_str()))
}

pub fn check_healthchecks(manifest: &Manifest, policy: &Policy, result: &mut ValidationResult) {
  for (name, service) in &manifest.services {
    if is_healthcheck_exempt(name, service, policy) {
      continue;
    }
    if service.healthcheck.is_none() {
      result.error(format!("service '{}' missing healthcheck", name));
    }
  }
}

/// Unknown dependencies are warnings; they may live in a file the resolver did not see.
pub fn check_dependencies(manifest: &Manifest, result: &mut ValidationResult) {
  for (name, service) in &manifest.services {
    for dep in extract::dependencies(service) {
      if !manifest.has_service(&dep) {
        result.warn(format!(
          "service '{}' depends on '{}' which is not defined locally (may come from include)",
          name, dep
        ));
      }
    }
  }
}

pub fn check_secret_references(manifest: &Manifest, result: &mut ValidationResult) {
  for (name, service) in &manifest.services {
    for reference in &service.secrets {
      let secret = extract::secret_name(reference);
      if secret.is_empty() {
        continue;
      }
      match &manifest.secrets {
        None => result.error(format!(
          "service '{}' references secret '{}' but no secrets section defined",
          name, secret
        )),
        Some(declared) if !declared.contains_key(secret) => {
          result.error(format!("service '{}' references undefined secret '{}'", name, secret))
        }
        Some(_) => {}
      }
    }
  }
}

/// Whether an environment value is a literal rather than a substitution or secret path.
fn is_literal_credential(value: &str) -> bool {
  !value.is_empty() && !value.starts_with('$') && !value.starts_with("/run/secrets/")
}

pub fn check_hardcoded_credentials(manifest: &Manifest, policy: &Policy, result: &mut ValidationResult) {
  for (name, service) in &manifest.services {
    if policy.is_infrastructure_service(name) {
      continue;
    }
    for (key, value) in extract::environment(service) {
      if extract::is_file_reference_key(&key) {
        continue;
      }
      if policy.credential_key_pattern.is_match(&key) && is_literal_credential(&value) {
        result.error(format!(
          "service '{}': environment variable '{}' appears to contain hardcoded credentials",
          name, key
        ));
      }
    }
  }
}

pub fn check_bind_mounts(manifest: &Manifest, policy: &Policy, result: &mut ValidationResult) {
  for (name, service) in &manifest.services {
    for volume in service.volume_specs() {
      for dangerous in &policy.dangerous_mounts {
        if volume.contains(dangerous.as_str()) {
          result.error(format!("service '{}': dangerous bind mount detected: {}", name, volume));
        }
      }
    }
  }
}
