//! Compose validation through the public entry point, includes included.

use deplint_lib::Policy;
use deplint_lib::compose::validate_compose_file;
use tempfile::TempDir;

use super::common::write;

#[test]
fn secrets_declared_in_an_include_resolve() {
  let temp = TempDir::new().unwrap();
  write(
    temp.path(),
    "shared/telemetry.yml",
    "services:\n  otel:\n    image: otel\n    healthcheck:\n      test: [\"CMD\", \"true\"]\nsecrets:\n  otel_token:\n    file: ./otel.secret\n",
  );
  let root = write(
    temp.path(),
    "compose.yml",
    "include:\n  - path: shared/telemetry.yml\nservices:\n  app:\n    depends_on: [otel]\n    secrets: [otel_token]\n    healthcheck:\n      test: [\"CMD\", \"true\"]\n",
  );

  let result = validate_compose_file(&root, &Policy::default());
  assert!(result.valid, "{:?}", result.errors);
  assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn missing_include_leaves_dependency_warning_only() {
  let temp = TempDir::new().unwrap();
  let root = write(
    temp.path(),
    "compose.yml",
    "include: [gone.yml]\nservices:\n  app:\n    depends_on: [otel]\n    healthcheck:\n      test: [\"CMD\", \"true\"]\n",
  );

  let result = validate_compose_file(&root, &Policy::default());
  assert!(result.valid);
  assert!(result.errors.is_empty());
  assert_eq!(result.warnings.len(), 1);
}

#[test]
fn every_check_reports_in_order() {
  let temp = TempDir::new().unwrap();
  let root = write(
    temp.path(),
    "compose.yml",
    r#"services:
  a:
    ports: ["9000:1"]
    depends_on: [ghost]
    secrets: [missing]
    environment:
      API_TOKEN: literal
    volumes:
      - /etc/passwd:/etc/passwd:ro
  b:
    ports: ["9000:2"]
    healthcheck:
      test: ["CMD", "true"]
secrets:
  present:
    external: true
"#,
  );

  let result = validate_compose_file(&root, &Policy::default());
  assert_eq!(
    result.errors,
    vec![
      "port conflict: host port 9000 used by both 'a' and 'b'",
      "service 'a' missing healthcheck",
      "service 'a' references undefined secret 'missing'",
      "service 'a': environment variable 'API_TOKEN' appears to contain hardcoded credentials",
      "service 'a': dangerous bind mount detected: /etc/passwd:/etc/passwd:ro",
    ]
  );
  assert_eq!(
    result.warnings,
    vec!["service 'a' depends on 'ghost' which is not defined locally (may come from include)"]
  );
}

#[test]
fn custom_policy_changes_exemptions() {
  let temp = TempDir::new().unwrap();
  let root = write(temp.path(), "compose.yml", "services:\n  migrate-job: {}\n");

  let policy = Policy::from_yaml("healthcheck-exempt-suffixes: [-job]\n").unwrap();
  assert!(validate_compose_file(&root, &policy).valid);
  assert!(!validate_compose_file(&root, &Policy::default()).valid);
}

#[test]
fn anchored_mount_in_include_is_flagged() {
  let temp = TempDir::new().unwrap();
  write(
    temp.path(),
    "agent.yml",
    "x-sock: &sock\n  volumes:\n    - /var/run/docker.sock:/sock\nservices:\n  agent:\n    <<: *sock\n    entrypoint: [\"echo\", \"once\"]\n",
  );
  let root = write(
    temp.path(),
    "compose.yml",
    "include: [agent.yml]\nservices:\n  app:\n    healthcheck:\n      test: [\"CMD\", \"true\"]\n",
  );

  let result = validate_compose_file(&root, &Policy::default());
  assert!(!result.valid);
  assert!(
    result
      .errors
      .iter()
      .all(|e| e == "service 'agent': dangerous bind mount detected: /var/run/docker.sock:/sock"),
    "{:?}",
    result.errors
  );
}
