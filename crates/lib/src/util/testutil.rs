//! Test utilities for orebuild-lib.
//!
//! Timestamps in tests are pinned to a fixed anchor so that comparisons do
//! not depend on how fast the filesystem ticks: [`write_tree`] places sources
//! well before the anchor and [`FakeRunner`] stamps everything it produces
//! after it, one second apart.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::execute::Runner;
use crate::template::Invocation;

const ANCHOR_SECS: u64 = 1_700_000_000;

fn anchor() -> SystemTime {
  UNIX_EPOCH + Duration::from_secs(ANCHOR_SECS)
}

/// Set the modification time of `path` to `secs` seconds before the anchor.
pub fn set_age(path: &Path, secs: u64) {
  set_mtime(path, anchor() - Duration::from_secs(secs));
}

fn set_mtime(path: &Path, time: SystemTime) {
  File::options()
    .write(true)
    .open(path)
    .and_then(|file| file.set_modified(time))
    .unwrap_or_else(|e| panic!("failed to set mtime of {}: {e}", path.display()));
}

/// Create files under `root` from `(relative path, contents)` pairs, all
/// dated well before anything a [`FakeRunner`] produces.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  for (name, contents) in files {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    set_age(&path, 10_000);
  }
}

/// A command the fake runner was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub command: String,
  pub cwd: PathBuf,
  pub echo: bool,
}

/// Records commands instead of running them.
///
/// For every successful command with a `-o <path>` argument the runner
/// creates that file (relative to the working directory) and stamps it with
/// the next tick of its clock, imitating a compiler or linker.
#[derive(Debug)]
pub struct FakeRunner {
  calls: Vec<Call>,
  fail_on: Option<String>,
  clock: SystemTime,
}

impl Default for FakeRunner {
  fn default() -> Self {
    Self {
      calls: Vec::new(),
      fail_on: None,
      clock: anchor(),
    }
  }
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fail every command containing `needle`.
  pub fn failing_on(mut self, needle: &str) -> Self {
    self.fail_on = Some(needle.to_string());
    self
  }

  pub fn calls(&self) -> &[Call] {
    &self.calls
  }

  pub fn commands(&self) -> Vec<&str> {
    self.calls.iter().map(|call| call.command.as_str()).collect()
  }

  /// Forget recorded calls, keeping the clock.
  pub fn clear(&mut self) {
    self.calls.clear();
  }

  /// Mark `path` as modified after everything produced so far.
  pub fn touch(&mut self, path: &Path) {
    let time = self.tick();
    set_mtime(path, time);
  }

  fn tick(&mut self) -> SystemTime {
    self.clock += Duration::from_secs(1);
    self.clock
  }
}

impl Runner for FakeRunner {
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<bool> {
    self.calls.push(Call {
      command: invocation.command.clone(),
      cwd: cwd.to_path_buf(),
      echo: invocation.echo,
    });

    if self
      .fail_on
      .as_deref()
      .is_some_and(|needle| invocation.command.contains(needle))
    {
      return Ok(false);
    }

    let mut words = invocation.command.split_whitespace();
    while let Some(word) = words.next() {
      if word == "-o"
        && let Some(out) = words.next()
      {
        let path = cwd.join(out);
        if let Some(parent) = path.parent() {
          fs::create_dir_all(parent)?;
        }
        fs::write(&path, &invocation.command)?;
        let time = self.tick();
        set_mtime(&path, time);
      }
    }
    Ok(true)
  }
}
