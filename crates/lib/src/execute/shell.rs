//! Shell-backed toolchain runner.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::Runner;
use crate::template::Invocation;

/// Runs each command through the platform shell, blocking until it exits.
///
/// Commands inherit the environment and standard streams of this process so
/// compiler diagnostics reach the terminal untouched, unless stdout is
/// redirected with [`ShellRunner::with_stdout_to_stderr`].
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
  stdout_to_stderr: bool,
}

impl ShellRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Send echoed commands and the commands' own stdout to stderr, leaving
  /// stdout free for a machine-readable report.
  pub fn with_stdout_to_stderr(mut self, enabled: bool) -> Self {
    self.stdout_to_stderr = enabled;
    self
  }

  fn echo(&self, out: &mut impl Write, err: &mut impl Write, invocation: &Invocation) -> io::Result<()> {
    if !invocation.echo {
      return Ok(());
    }
    let sink: &mut dyn Write = if self.stdout_to_stderr { err } else { out };
    writeln!(sink, "{}", invocation.command)
  }
}

impl Runner for ShellRunner {
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<bool> {
    self.echo(&mut io::stdout().lock(), &mut io::stderr().lock(), invocation)?;

    let (shell, args) = get_shell();
    debug!(shell = %shell, cwd = ?cwd, command = %invocation.command, "spawning process");

    let mut command = Command::new(&shell);
    command.args(&args).arg(&invocation.command).current_dir(cwd);
    if self.stdout_to_stderr {
      command.stdout(Stdio::from(io::stderr()));
    }
    let status = command.status()?;

    if !status.success() {
      warn!(code = ?status.code(), command = %invocation.command, "command failed");
    }
    Ok(status.success())
  }
}

/// Get the shell command and arguments for the current platform.
fn get_shell() -> (String, Vec<String>) {
  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  #[cfg(unix)]
  fn successful_command() {
    let temp = TempDir::new().unwrap();
    let ok = ShellRunner::new().run(&Invocation::new("@true"), temp.path()).unwrap();
    assert!(ok);
  }

  #[test]
  #[cfg(unix)]
  fn failing_command() {
    let temp = TempDir::new().unwrap();
    let ok = ShellRunner::new().run(&Invocation::new("@exit 3"), temp.path()).unwrap();
    assert!(!ok);
  }

  #[test]
  #[cfg(unix)]
  fn runs_in_given_directory() {
    let temp = TempDir::new().unwrap();
    ShellRunner::new()
      .run(&Invocation::new("@touch cwd_marker"), temp.path())
      .unwrap();
    assert!(temp.path().join("cwd_marker").exists());
  }

  #[test]
  fn echo_goes_to_stdout_by_default() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    ShellRunner::new()
      .echo(&mut out, &mut err, &Invocation::new("cc -c a.c"))
      .unwrap();
    assert_eq!(out, b"cc -c a.c\n");
    assert!(err.is_empty());
  }

  #[test]
  fn echo_can_be_moved_to_stderr() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    ShellRunner::new()
      .with_stdout_to_stderr(true)
      .echo(&mut out, &mut err, &Invocation::new("cc -c a.c"))
      .unwrap();
    assert!(out.is_empty());
    assert_eq!(err, b"cc -c a.c\n");
  }

  #[test]
  fn quiet_commands_are_not_echoed() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    ShellRunner::new()
      .echo(&mut out, &mut err, &Invocation::new("@cc -c a.c"))
      .unwrap();
    assert!(out.is_empty() && err.is_empty());
  }

  #[test]
  #[cfg(unix)]
  fn redirected_command_still_runs() {
    let temp = TempDir::new().unwrap();
    let ok = ShellRunner::new()
      .with_stdout_to_stderr(true)
      .run(&Invocation::new("echo noise && touch marker"), temp.path())
      .unwrap();
    assert!(ok);
    assert!(temp.path().join("marker").exists());
  }

  #[test]
  fn get_shell_default() {
    let (shell, args) = get_shell();
    #[cfg(unix)]
    {
      assert_eq!(shell, "/bin/sh");
      assert_eq!(args, vec!["-c"]);
    }
    #[cfg(windows)]
    {
      assert_eq!(shell, "cmd.exe");
      assert_eq!(args, vec!["/C"]);
    }
  }
}
