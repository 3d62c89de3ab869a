//! Shared utilities.
//!
//! Path helpers used across the crate, plus test helpers.

use std::path::{Component, Path, PathBuf};

#[cfg(test)]
pub mod testutil;

/// Join `path` onto `base` and fold `.` and `..` components without touching
/// the filesystem.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
  let mut result = PathBuf::new();
  for component in base.join(path).components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        result.pop();
      }
      other => result.push(other),
    }
  }
  result
}

/// Render a path for a command line, always with `/` separators.
pub fn command_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
