//! Compose manifest parsing and validation.
//!
//! # Modules
//!
//! - [`types`] - typed manifest model
//! - [`include`] - loading and left-biased include merging
//! - [`extract`] - normalization of multi-shape fields
//! - [`validate`] - structural and security checks

pub mod extract;
pub mod include;
mod types;
pub mod validate;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use include::{load_manifest, resolve_includes};
pub use types::*;
pub use validate::validate_compose_file;

/// Errors loading a root manifest.
#[derive(Debug, Error)]
pub enum ComposeError {
  #[error("failed to read compose file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse compose file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },
}
