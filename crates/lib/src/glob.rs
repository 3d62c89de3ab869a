//! Wildcard file discovery.
//!
//! Patterns understand three wildcards:
//!
//! - `?` matches one character other than `/`
//! - `*` matches any run of characters other than `/`
//! - `**` matches any run of characters, `/` included
//!
//! A pattern without wildcards is a literal path and is returned untouched,
//! without consulting the filesystem. Otherwise the directory part in front of
//! the first wildcard is walked recursively and every candidate path is
//! matched against the whole pattern.
//!
//! All paths are relative to an explicit base directory; the process working
//! directory is never consulted.

use std::path::Path;

use regex::Regex;
use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

/// Which kind of filesystem entry a pattern should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Regular files (anything that is not a directory).
  Files,
  /// Directories only, used for include discovery.
  Directories,
}

#[derive(Debug, Error)]
pub enum GlobError {
  #[error("invalid pattern '{pattern}': {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },
}

/// Expand `pattern` relative to `base`.
///
/// Results use `/` as separator and carry no leading `./`. Order follows a
/// file-name-sorted walk, so it is stable across runs on an unchanged tree.
/// A search root that does not exist yields an empty list.
pub fn glob(base: &Path, pattern: &str, mode: Mode) -> Result<Vec<String>, GlobError> {
  let Some(wildcard) = pattern.find(['*', '?']) else {
    return Ok(vec![pattern.to_string()]);
  };

  let matcher = compile(pattern)?;
  let root = match pattern[..wildcard].rfind(['/', '\\']) {
    Some(0) => "/",
    Some(sep) => &pattern[..sep],
    None => ".",
  };

  let search_root = base.join(root);
  if !search_root.is_dir() {
    trace!(root = ?search_root, "glob root missing");
    return Ok(Vec::new());
  }

  let mut result = Vec::new();
  for entry in WalkDir::new(&search_root)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
  {
    if entry.file_type().is_dir() != (mode == Mode::Directories) {
      continue;
    }

    let path = entry.path();
    let relative = path.strip_prefix(base).unwrap_or(path);
    let candidate = normalize(&relative.to_string_lossy());
    if matcher.is_match(&candidate) {
      result.push(candidate);
    }
  }

  trace!(pattern, matches = result.len(), "glob expanded");
  Ok(result)
}

/// Translate a pattern into an anchored regular expression.
fn compile(pattern: &str) -> Result<Regex, GlobError> {
  let normalized = normalize(pattern);
  let mut expr = String::with_capacity(normalized.len() * 2 + 2);
  expr.push('^');

  let mut chars = normalized.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '*' if chars.peek() == Some(&'*') => {
        chars.next();
        expr.push_str(".*");
      }
      '*' => expr.push_str("[^/]*"),
      '?' => expr.push_str("[^/]"),
      c => {
        let mut buf = [0u8; 4];
        expr.push_str(&regex::escape(c.encode_utf8(&mut buf)));
      }
    }
  }
  expr.push('$');

  Regex::new(&expr).map_err(|source| GlobError::InvalidPattern {
    pattern: pattern.to_string(),
    source,
  })
}

fn normalize(path: &str) -> String {
  let path = path.replace('\\', "/");
  match path.strip_prefix("./") {
    Some(stripped) => stripped.to_string(),
    None => path,
  }
}
