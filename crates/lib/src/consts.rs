//! Well-known file and directory names of a deployment tree.

/// Environment variable naming a policy file when `--policy` is not given.
pub const POLICY_ENV_VAR: &str = "DEPLINT_POLICY";

/// Compose file names, highest priority first.
pub const COMPOSE_FILE_NAMES: &[&str] = &["compose.yml", "compose.yaml", "docker-compose.yml", "docker-compose.yaml"];

pub const SECRETS_DIR: &str = "secrets";

/// Config directory names, in lookup order.
pub const CONFIG_DIRS: &[&str] = &["config", "configs"];

pub const SECRET_FILE_SUFFIXES: &[&str] = &[".secret", ".secret.never"];

pub const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

pub const DOCKERFILE: &str = "Dockerfile";

/// Secrets every service-level deployment and the template must ship.
pub const REQUIRED_SERVICE_SECRETS: &[&str] = &[
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
