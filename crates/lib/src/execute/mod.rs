//! Toolchain execution.
//!
//! Commands produced by the template engine are handed to a [`Runner`], one
//! at a time, in the module directory they belong to. Only success or failure
//! is observed.

pub mod shell;

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::template::Invocation;

pub use shell::ShellRunner;

/// Something that can run toolchain commands.
pub trait Runner {
  /// Run `invocation` with `cwd` as its working directory.
  ///
  /// Returns `Ok(false)` when the command ran but reported failure.
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<bool>;
}

/// Errors that can occur while running toolchain commands.
#[derive(Debug, Error)]
pub enum ExecuteError {
  #[error("failed to spawn '{command}': {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  #[error("command failed: {command}")]
  Failed { command: String },
}

/// Run invocations in order, stopping at the first failure.
///
/// Returns the number of commands that ran. Artifacts written by earlier
/// commands are left in place when a later one fails.
pub fn execute_all<R: Runner + ?Sized>(
  runner: &mut R,
  invocations: &[Invocation],
  cwd: &Path,
) -> Result<usize, ExecuteError> {
  for invocation in invocations {
    info!(command = %invocation.command, "running");
    let ok = runner.run(invocation, cwd).map_err(|source| ExecuteError::Spawn {
      command: invocation.command.clone(),
      source,
    })?;
    if !ok {
      return Err(ExecuteError::Failed {
        command: invocation.command.clone(),
      });
    }
  }
  Ok(invocations.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::FakeRunner;
  use tempfile::TempDir;

  #[test]
  fn runs_every_invocation_in_order() {
    let temp = TempDir::new().unwrap();
    let mut runner = FakeRunner::new();
    let invocations = [Invocation::new("first"), Invocation::new("@second")];

    let count = execute_all(&mut runner, &invocations, temp.path()).unwrap();

    assert_eq!(count, 2);
    assert_eq!(runner.commands(), vec!["first", "second"]);
  }

  #[test]
  fn stops_at_first_failure() {
    let temp = TempDir::new().unwrap();
    let mut runner = FakeRunner::new().failing_on("bad");
    let invocations = [
      Invocation::new("good one"),
      Invocation::new("bad one"),
      Invocation::new("never"),
    ];

    let err = execute_all(&mut runner, &invocations, temp.path()).unwrap_err();

    assert!(matches!(err, ExecuteError::Failed { ref command } if command == "bad one"));
    assert_eq!(runner.commands(), vec!["good one", "bad one"]);
  }

  #[test]
  fn empty_list_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let mut runner = FakeRunner::new();
    assert_eq!(execute_all(&mut runner, &[], temp.path()).unwrap(), 0);
    assert!(runner.commands().is_empty());
  }
}
