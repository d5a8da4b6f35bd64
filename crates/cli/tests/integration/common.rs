//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Secrets a product service must ship.
pub const SERVICE_SECRETS: &[&str] = &[
  "unseal_1of5.secret",
  "unseal_2of5.secret",
  "unseal_3of5.secret",
  "unseal_4of5.secret",
  "unseal_5of5.secret",
  "hash_pepper_v3.secret",
  "postgres_url.secret",
  "postgres_username.secret",
  "postgres_password.secret",
  "postgres_database.secret",
];

pub const HEALTHY_COMPOSE: &str = r#"services:
  app:
    image: app:latest
    ports:
      - "8080:8080"
    secrets:
      - unseal_1of5
    environment:
      DATABASE_PASSWORD_FILE: /run/secrets/postgres_password
    healthcheck:
      test: ["CMD", "wget", "-q", "-O", "-", "https://127.0.0.1:9090/admin/api/v1/livez"]
secrets:
  unseal_1of5:
    file: ./secrets/unseal_1of5.secret
"#;

pub const HEALTHY_CONFIG: &str = "bind-public-protocol: https
bind-public-address: 0.0.0.0
bind-public-port: 8080
bind-private-address: 127.0.0.1
database-url: file:///run/secrets/postgres_url.secret
";

/// Isolated deployment tree.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// A product-service deployment that passes every check.
  pub fn healthy_service(&self, name: &str) -> PathBuf {
    self.write_file(&format!("{}/compose.yml", name), HEALTHY_COMPOSE);
    self.write_file(&format!("{}/Dockerfile", name), "FROM scratch\n");
    self.write_file(&format!("{}/config/app.yml", name), HEALTHY_CONFIG);
    for secret in SERVICE_SECRETS {
      self.write_file(&format!("{}/secrets/{}-{}", name, name, secret), &"s".repeat(44));
    }
    self.temp.path().join(name)
  }

  /// Get a Command for the deplint binary with no ambient policy.
  pub fn deplint_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("deplint");
    cmd.env_remove("DEPLINT_POLICY").env_remove("RUST_LOG");
    cmd
  }
}
