//! Compose command integration tests.

use predicates::prelude::*;

use super::common::{HEALTHY_COMPOSE, TestEnv};

#[test]
fn healthy_compose_passes() {
  let env = TestEnv::empty();
  let compose = env.write_file("compose.yml", HEALTHY_COMPOSE);

  env
    .deplint_cmd()
    .arg("compose")
    .arg(&compose)
    .assert()
    .success()
    .stdout(predicate::str::contains("Status: PASS"));
}

#[test]
fn violations_are_listed_in_text_output() {
  let env = TestEnv::empty();
  let compose = env.write_file(
    "compose.yml",
    "services:\n  web:\n    image: nginx\n    volumes:\n      - /var/run/docker.sock:/var/run/docker.sock\n",
  );

  env
    .deplint_cmd()
    .arg("compose")
    .arg(&compose)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("ERROR: service 'web' missing healthcheck"))
    .stdout(predicate::str::contains("dangerous bind mount detected"));
}

#[test]
fn json_output_carries_the_result() {
  let env = TestEnv::empty();
  let compose = env.write_file("compose.yml", "services:\n  init-db:\n    image: tool\n");

  let output = env
    .deplint_cmd()
    .args(["--output", "json", "compose"])
    .arg(&compose)
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["valid"], true);
  assert_eq!(json["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn policy_file_extends_exemptions() {
  let env = TestEnv::empty();
  let compose = env.write_file("compose.yml", "services:\n  migrate-job:\n    image: tool\n");
  let policy = env.write_file("policy.yml", "healthcheck-exempt-suffixes: [-job]\n");

  env.deplint_cmd().arg("compose").arg(&compose).assert().code(1);

  env
    .deplint_cmd()
    .arg("--policy")
    .arg(&policy)
    .arg("compose")
    .arg(&compose)
    .assert()
    .success();

  env
    .deplint_cmd()
    .env("DEPLINT_POLICY", &policy)
    .arg("compose")
    .arg(&compose)
    .assert()
    .success();
}

#[test]
fn unparsable_compose_is_a_finding() {
  let env = TestEnv::empty();
  let compose = env.write_file("compose.yml", "services: [unterminated\n");

  env
    .deplint_cmd()
    .arg("compose")
    .arg(&compose)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("YAML parse error"));
}
