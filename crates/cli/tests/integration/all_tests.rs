//! Whole-tree audit integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn healthy_tree_passes() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");
  env.healthy_service("jose-ja");

  env
    .deplint_cmd()
    .arg("all")
    .arg(env.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("Validated 2 deployments: 2 valid, 0 with issues"))
    .stdout(predicate::str::contains("ALL VALIDATORS PASSED"))
    .stdout(predicate::str::contains("Time per check:"));
}

#[test]
fn one_broken_deployment_fails_the_run() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");
  env.healthy_service("pki-ca");
  env.write_file("pki-ca/config/app.yml", "bind-private-address: 0.0.0.0\n");

  env
    .deplint_cmd()
    .arg("all")
    .arg(env.root())
    .assert()
    .code(1)
    .stdout(predicate::str::contains("[FAIL] config"))
    .stdout(predicate::str::contains("VALIDATION FAILED"));
}

#[test]
fn zero_budget_runs_nothing_and_fails() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");

  env
    .deplint_cmd()
    .args(["all", "--budget", "0s"])
    .arg(env.root())
    .assert()
    .code(1)
    .stdout(predicate::str::contains("Not run (time budget exhausted): sm-kms"));
}

#[test]
fn json_report_lists_runs() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");

  let output = env.deplint_cmd().args(["--output", "json", "all"]).arg(env.root()).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert!(!json["runs"].as_array().unwrap().is_empty());
  assert_eq!(json["deployments"][0]["level"], "PRODUCT-SERVICE");
  assert!(json["not_run"].as_array().unwrap().is_empty());
}

#[test]
fn configs_root_is_mirrored() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");
  env.healthy_service("jose-ja");
  let configs = tempfile::TempDir::new().unwrap();
  std::fs::create_dir(configs.path().join("sm")).unwrap();

  env
    .deplint_cmd()
    .arg("all")
    .arg(env.root())
    .arg("--configs")
    .arg(configs.path())
    .assert()
    .code(1)
    .stdout(predicate::str::contains("Status: FAIL (missing=1, orphans=0)"))
    .stdout(predicate::str::contains("deployment 'jose-ja' has no config directory 'jose'"))
    .stdout(predicate::str::contains("[FAIL] mirror"));

  std::fs::create_dir(configs.path().join("jose")).unwrap();
  env
    .deplint_cmd()
    .arg("all")
    .arg(env.root())
    .arg("--configs")
    .arg(configs.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Status: PASS (missing=0, orphans=0)"));
}

#[test]
fn missing_configs_root_is_an_operational_error() {
  let env = TestEnv::empty();
  env.healthy_service("sm-kms");

  env
    .deplint_cmd()
    .arg("all")
    .arg(env.root())
    .arg("--configs")
    .arg(env.root().join("no-such-configs"))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Configs root is not a directory"));
}
