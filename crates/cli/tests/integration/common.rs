//! Shared test helpers for CLI integration tests.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A project whose "compiler" concatenates its sources, so builds work on
/// any unix machine.
pub const CAT_PROJECT: &str = r#"
// Concatenates every source into the output.
output "out.txt";
include "";
files "src/*.txt";
command "@cat $files > $out";
"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory with an isolated library root,
/// and a fixed platform and configuration.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Project directory.
  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Write a file relative to the temp directory.
  ///
  /// The file is dated an hour back so that anything a build produces is
  /// strictly newer.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    File::options()
      .write(true)
      .open(&path)
      .and_then(|file| file.set_modified(SystemTime::now() - Duration::from_secs(3600)))
      .unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Get an ore command isolated to this environment.
  pub fn ore_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("ore");
    cmd
      .current_dir(self.root())
      .arg("--libraries")
      .arg(self.path("libraries"))
      .env("OREBUILD_PLATFORM", "Linux")
      .env("OREBUILD_CONFIGURATION", "Debug")
      .env_remove("RUST_LOG");
    cmd
  }
}
