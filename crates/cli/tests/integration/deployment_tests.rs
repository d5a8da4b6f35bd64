//! Secrets, ports and structure command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn healthy_service_passes_each_check() {
  let env = TestEnv::empty();
  let dir = env.healthy_service("sm-kms");

  for cmd in ["secrets", "ports", "structure"] {
    env.deplint_cmd().arg(cmd).arg(&dir).assert().success();
  }
}

#[test]
fn structure_reports_missing_pieces() {
  let env = TestEnv::empty();
  let dir = env.healthy_service("jose-ja");
  std::fs::remove_file(dir.join("Dockerfile")).unwrap();
  std::fs::remove_file(dir.join("secrets/jose-ja-hash_pepper_v3.secret")).unwrap();

  env
    .deplint_cmd()
    .arg("structure")
    .arg(&dir)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("❌ INVALID"))
    .stdout(predicate::str::contains("Missing files: Dockerfile"))
    .stdout(predicate::str::contains("Missing secrets: hash_pepper_v3.secret"));
}

#[test]
fn explicit_level_overrides_the_name() {
  let env = TestEnv::empty();
  let dir = env.root().join("anything");
  env.write_file("anything/compose.yml", "services: {}\n");

  env
    .deplint_cmd()
    .args(["structure", "--level", "infrastructure"])
    .arg(&dir)
    .assert()
    .success()
    .stdout(predicate::str::contains("(infrastructure)"));
}

#[test]
fn ports_outside_the_level_range_fail() {
  let env = TestEnv::empty();
  let dir = env.healthy_service("pki-ca");
  env.write_file("pki-ca/compose.yml", "services:\n  app:\n    ports: [\"18080:8080\"]\n");

  env
    .deplint_cmd()
    .arg("ports")
    .arg(&dir)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("18080"));

  env
    .deplint_cmd()
    .args(["ports", "--level", "PRODUCT"])
    .arg(&dir)
    .assert()
    .code(1);
}

#[test]
fn empty_secret_fails() {
  let env = TestEnv::empty();
  let dir = env.healthy_service("cipher-im");
  env.write_file("cipher-im/secrets/cipher-im-unseal_1of5.secret", "");

  env
    .deplint_cmd()
    .arg("secrets")
    .arg(&dir)
    .assert()
    .code(1)
    .stdout(predicate::str::contains("secret file 'cipher-im-unseal_1of5.secret' is empty"));
}
