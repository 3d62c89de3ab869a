//! Implementation of the `ore build` and `ore rebuild` commands.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;

use orebuild_lib::build::{self, BuildOptions, Resolved};
use orebuild_lib::consts::{LIBRARY_FILE, PROJECT_FILE};
use orebuild_lib::execute::ShellRunner;

use super::Settings;
use crate::output::{format_duration, print_info, print_json, print_stat, print_success, symbols};

#[derive(Serialize)]
struct BuildReport<'a> {
  descriptor: &'a Path,
  platform: &'a str,
  configuration: &'a str,
  duration_ms: u128,
  #[serde(flatten)]
  resolved: &'a Resolved,
}

/// Build the project found at `target` and print a summary.
///
/// `target` may be a directory or a descriptor file. With `rebuild` every
/// unit is treated as stale.
pub fn cmd_build(target: &Path, rebuild: bool, settings: &Settings) -> Result<Resolved> {
  let descriptor = locate_descriptor(target)?;
  debug!(descriptor = ?descriptor, selector = %settings.selector, "starting build");

  let options = BuildOptions::new(settings.selector.clone(), &settings.library_root).with_rebuild(rebuild);
  let mut runner = ShellRunner::new().with_stdout_to_stderr(settings.format.is_json());

  let start = Instant::now();
  let resolved = build::build(&descriptor, &options, &mut runner)
    .with_context(|| format!("Build of {} failed", descriptor.display()))?;
  let elapsed = start.elapsed();

  if settings.format.is_json() {
    print_json(&BuildReport {
      descriptor: &descriptor,
      platform: &settings.selector.platform,
      configuration: &settings.selector.configuration,
      duration_ms: elapsed.as_millis(),
      resolved: &resolved,
    })?;
  } else {
    print_summary(&descriptor, &resolved, elapsed, settings);
  }

  Ok(resolved)
}

fn print_summary(descriptor: &Path, resolved: &Resolved, elapsed: Duration, settings: &Settings) {
  let target = resolved.output.as_deref().unwrap_or(descriptor);
  if resolved.skipped {
    print_info(&format!("{} is up to date", target.display()));
    return;
  }

  print_success(&format!("Built {} in {}", target.display(), format_duration(elapsed)));
  print_stat("Configuration", &settings.selector.to_string());
  print_stat("Commands", &resolved.commands.to_string());

  if settings.verbose && !resolved.objects.is_empty() {
    println!();
    println!("Objects:");
    for object in &resolved.objects {
      println!("  {} {}", symbols::INFO, object.display());
    }
  }
}

/// Find the descriptor to build.
///
/// A file is used as is. In a directory, a project descriptor (matched
/// case-insensitively) is preferred over a library descriptor.
pub(super) fn locate_descriptor(target: &Path) -> Result<PathBuf> {
  if target.is_file() {
    return Ok(target.to_path_buf());
  }
  if !target.is_dir() {
    bail!("{} does not exist", target.display());
  }

  let entries = std::fs::read_dir(target).with_context(|| format!("Failed to read {}", target.display()))?;
  let mut library = None;
  for entry in entries.filter_map(Result::ok) {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if name.eq_ignore_ascii_case(PROJECT_FILE) {
      return Ok(entry.path());
    }
    if name == LIBRARY_FILE {
      library = Some(entry.path());
    }
  }

  library.with_context(|| {
    format!(
      "No {PROJECT_FILE} or {LIBRARY_FILE} found in {}",
      target.display()
    )
  })
}
