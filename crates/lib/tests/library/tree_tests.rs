//! Whole-tree audits.

use deplint_lib::Policy;
use deplint_lib::audit::audit_tree;
use deplint_lib::report::{format_audit_summary, format_mirror_result, format_structure_report};
use tempfile::TempDir;

use super::common::{healthy_service, write};

#[test]
fn healthy_tree_passes_every_check() {
  let temp = TempDir::new().unwrap();
  healthy_service(temp.path(), "sm-kms");
  healthy_service(temp.path(), "jose-ja");
  write(
    temp.path(),
    "shared-postgres/compose.yml",
    "services:\n  postgres:\n    image: postgres\n    healthcheck:\n      test: [\"CMD\", \"pg_isready\"]\n",
  );

  let report = audit_tree(temp.path(), None, &Policy::default(), None);
  assert!(report.passed(), "{}", format_structure_report(&report.deployments));
  assert!(format_audit_summary(&report).ends_with("ALL VALIDATORS PASSED\n"));
}

#[test]
fn broken_service_is_listed_first() {
  let temp = TempDir::new().unwrap();
  healthy_service(temp.path(), "cipher-im");
  let broken = healthy_service(temp.path(), "pki-ca");
  write(&broken, "config/app.yml", "bind-private-address: 0.0.0.0\n");
  write(&broken, "secrets/pki-ca-hash_pepper_v3.secret", "");

  let report = audit_tree(temp.path(), None, &Policy::default(), None);
  assert!(!report.passed());

  let text = format_structure_report(&report.deployments);
  assert!(text.starts_with("Validated 2 deployments: 1 valid, 1 with issues\n\n❌ INVALID "));
  assert!(text.contains("[config] POLICY VIOLATION: 'bind-private-address' must be '127.0.0.1'"));
  assert!(text.contains("[secrets] secret file 'pki-ca-hash_pepper_v3.secret' is empty"));

  let cipher = text.find("cipher-im").unwrap();
  let pki = text.find("pki-ca").unwrap();
  assert!(pki < cipher);
}

#[test]
fn mirror_check_joins_the_audit() {
  let temp = TempDir::new().unwrap();
  let deployments = temp.path().join("deployments");
  let configs = temp.path().join("configs");
  healthy_service(&deployments, "sm-kms");
  healthy_service(&deployments, "identity-authz");
  write(&configs, "sm/sm.yml", "bind-public-port: 8080\n");
  write(&configs, "legacy/legacy.yml", "bind-public-port: 8080\n");

  let report = audit_tree(&deployments, Some(configs.as_path()), &Policy::default(), None);
  assert!(!report.passed());

  let mirror = report.mirror.as_ref().unwrap();
  assert_eq!(mirror.missing_mirrors, vec!["identity-authz"]);
  assert_eq!(mirror.orphans, vec!["legacy"]);

  let text = format_mirror_result(mirror);
  assert!(text.contains("Status: FAIL (missing=1, orphans=1)"));
  assert!(text.contains("deployment 'identity-authz' has no config directory 'identity'"));
  assert!(format_audit_summary(&report).contains("Failed validators:\n  - mirror ("));
}
