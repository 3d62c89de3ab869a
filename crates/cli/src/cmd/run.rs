//! Implementation of the `ore run` command.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::info;

use super::{Settings, cmd_build};

/// Build the project, then run its output with `args`.
///
/// Returns the program's exit code.
pub fn cmd_run(target: &Path, args: &[String], settings: &Settings) -> Result<i32> {
  let resolved = cmd_build(target, false, settings)?;
  let program = resolved
    .output
    .with_context(|| format!("{} has no output to run", target.display()))?;

  info!(program = ?program, "running output");
  let status = Command::new(&program)
    .args(args)
    .status()
    .with_context(|| format!("Failed to run {}", program.display()))?;

  Ok(status.code().unwrap_or(1))
}
