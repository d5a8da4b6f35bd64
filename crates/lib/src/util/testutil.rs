//! Test fixtures for deplint-lib.
//!
//! Helpers that lay out deployment trees on disk inside a temp directory.

use std::fs;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::{fs::Permissions, os::unix::fs::PermissionsExt};

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, content).unwrap();
  path
}

/// Create `root/rel` as a directory.
pub fn make_dir(root: &Path, rel: &str) -> PathBuf {
  let path = root.join(rel);
  fs::create_dir_all(&path).unwrap();
  path
}

/// A secret value long enough to pass the default length check.
pub fn strong_secret() -> String {
  "k".repeat(44)
}

/// Strips every permission bit from a path and restores the original mode on drop.
#[cfg(unix)]
pub struct Locked {
  path: PathBuf,
  mode: Permissions,
}

#[cfg(unix)]
impl Locked {
  pub fn new(path: &Path) -> Self {
    let mode = fs::metadata(path).unwrap().permissions();
    fs::set_permissions(path, Permissions::from_mode(0o000)).unwrap();
    Self {
      path: path.to_path_buf(),
      mode,
    }
  }
}

#[cfg(unix)]
impl Drop for Locked {
  fn drop(&mut self) {
    let _ = fs::set_permissions(&self.path, self.mode.clone());
  }
}
