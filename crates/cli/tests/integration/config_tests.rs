//! Config command integration tests.

use predicates::prelude::*;

use super::common::{HEALTHY_CONFIG, TestEnv};

#[test]
fn healthy_config_passes() {
  let env = TestEnv::empty();
  let config = env.write_file("app.yml", HEALTHY_CONFIG);

  env.deplint_cmd().arg("config").arg(&config).assert().success();
}

#[test]
fn directory_arguments_are_searched() {
  let env = TestEnv::empty();
  env.write_file("configs/good.yml", HEALTHY_CONFIG);
  env.write_file("configs/nested/bad.yaml", "bind-private-address: 0.0.0.0\n");

  env
    .deplint_cmd()
    .arg("config")
    .arg(env.root().join("configs"))
    .assert()
    .code(1)
    .stdout(predicate::str::contains("good.yml"))
    .stdout(predicate::str::contains(
      "POLICY VIOLATION: 'bind-private-address' must be '127.0.0.1'",
    ));
}

#[test]
fn empty_directory_is_an_operational_error() {
  let env = TestEnv::empty();
  env.write_file("configs/README.md", "nothing here\n");

  env
    .deplint_cmd()
    .arg("config")
    .arg(env.root().join("configs"))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("No config files found"));
}

#[test]
fn json_output_is_one_entry_per_file() {
  let env = TestEnv::empty();
  let a = env.write_file("a.yml", HEALTHY_CONFIG);
  let b = env.write_file("b.yml", "- not\n- a\n- mapping\n");

  let output = env
    .deplint_cmd()
    .args(["-o", "json", "config"])
    .arg(&a)
    .arg(&b)
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(1));
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let entries = json.as_array().unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0]["valid"], true);
  assert_eq!(entries[1]["errors"][0], "config must be a YAML mapping, got list");
}
