//! Library discovery and installation.
//!
//! Both operations delegate to external tools: `gh` for searching GitHub and
//! `git` for cloning. Installed libraries land in the library root, one
//! directory per repository, where `library` dependencies are looked up.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::LIBRARY_FILE;

const GITHUB: &str = "https://github.com";

/// Languages a search result must be written in to be listed.
const LANGUAGES: [&str; 2] = ["C", "C++"];

/// A repository returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
  pub full_name: String,
  #[serde(default)]
  pub language: Option<String>,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installed {
  /// Directory the repository was cloned into.
  pub path: PathBuf,
  /// Whether the clone ships its own library descriptor.
  pub has_descriptor: bool,
}

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("{program} failed ({status}) {stderr}")]
  Failed {
    program: String,
    status: String,
    stderr: String,
  },

  #[error("failed to parse search results: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("invalid repository name '{0}', expected OWNER/REPO")]
  InvalidName(String),

  #[error("'{}' already exists", .0.display())]
  AlreadyInstalled(PathBuf),

  #[error("io error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Search GitHub for C and C++ repositories matching `query`.
pub fn search(query: &str) -> Result<Vec<Repository>, PackageError> {
  let program = "gh";
  debug!(query, "searching repositories");
  let output = Command::new(program)
    .args(["search", "repos", query, "--json", "fullName,language"])
    .stderr(Stdio::piped())
    .output()
    .map_err(|source| PackageError::Spawn {
      program: program.to_string(),
      source,
    })?;

  if !output.status.success() {
    return Err(PackageError::Failed {
      program: program.to_string(),
      status: output.status.to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }
  parse_search(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `gh search repos --json` output, keeping C and C++ repositories.
pub fn parse_search(json: &str) -> Result<Vec<Repository>, PackageError> {
  let repositories: Vec<Repository> = serde_json::from_str(json)?;
  Ok(
    repositories
      .into_iter()
      .filter(|repo| repo.language.as_deref().is_some_and(|lang| LANGUAGES.contains(&lang)))
      .collect(),
  )
}

/// Clone `OWNER/REPO` from GitHub into `library_root`, creating it if needed.
pub fn install(name: &str, library_root: &Path) -> Result<Installed, PackageError> {
  let repo = validate_name(name)?;
  let path = library_root.join(repo);
  if path.exists() {
    return Err(PackageError::AlreadyInstalled(path));
  }

  fs::create_dir_all(library_root).map_err(|source| PackageError::Io {
    path: library_root.to_path_buf(),
    source,
  })?;

  let program = "git";
  let url = format!("{GITHUB}/{name}");
  info!(url = %url, root = ?library_root, "cloning library");
  let status = Command::new(program)
    .args(["clone", "--recursive", &url])
    .current_dir(library_root)
    .status()
    .map_err(|source| PackageError::Spawn {
      program: program.to_string(),
      source,
    })?;

  if !status.success() {
    return Err(PackageError::Failed {
      program: program.to_string(),
      status: status.to_string(),
      stderr: String::new(),
    });
  }

  let has_descriptor = path.join(LIBRARY_FILE).is_file();
  Ok(Installed { path, has_descriptor })
}

/// Check an `OWNER/REPO` name and return the repository part.
fn validate_name(name: &str) -> Result<&str, PackageError> {
  let invalid = || PackageError::InvalidName(name.to_string());
  let (owner, repo) = name.split_once('/').ok_or_else(invalid)?;
  let valid = |part: &str| {
    !part.is_empty()
      && part != "."
      && part != ".."
      && part
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
  };
  if valid(owner) && valid(repo) {
    Ok(repo)
  } else {
    Err(invalid())
  }
}
