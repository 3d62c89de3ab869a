//! Implementation of the `ore search` command.

use anyhow::{Context, Result};

use orebuild_lib::package;

use super::Settings;
use crate::output::{print_info, print_json, symbols};

pub fn cmd_search(query: &str, settings: &Settings) -> Result<()> {
  let repositories = package::search(query).context("Search failed")?;

  if settings.format.is_json() {
    return print_json(&repositories);
  }

  if repositories.is_empty() {
    print_info(&format!("No C or C++ libraries found for '{query}'"));
    return Ok(());
  }
  for repo in &repositories {
    let language = repo.language.as_deref().unwrap_or_default();
    println!("  {} {} ({language})", symbols::ARROW, repo.full_name);
  }
  Ok(())
}
