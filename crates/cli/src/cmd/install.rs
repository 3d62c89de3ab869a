//! Implementation of the `ore install` command.

use anyhow::{Context, Result};

use orebuild_lib::consts::LIBRARY_FILE;
use orebuild_lib::package;

use super::Settings;
use crate::output::{print_json, print_success, print_warning};

pub fn cmd_install(name: &str, settings: &Settings) -> Result<()> {
  let installed = package::install(name, &settings.library_root).with_context(|| format!("Failed to install {name}"))?;

  if settings.format.is_json() {
    return print_json(&installed);
  }

  print_success(&format!("Installed {name} into {}", installed.path.display()));
  if !installed.has_descriptor {
    print_warning(&format!(
      "{name} ships no {LIBRARY_FILE}; write one in {} before depending on it",
      installed.path.display()
    ));
  }
  Ok(())
}
