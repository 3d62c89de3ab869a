use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::descriptor::DescriptorError;
use crate::execute::ExecuteError;
use crate::glob::GlobError;
use crate::platform::Selector;
use crate::template::TemplateError;

/// Settings shared by every module of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
  /// Active platform and configuration.
  pub selector: Selector,
  /// Directory holding one sub-directory per installed library.
  pub library_root: PathBuf,
  /// Treat every unit as stale.
  pub rebuild: bool,
}

impl BuildOptions {
  pub fn new(selector: Selector, library_root: impl Into<PathBuf>) -> Self {
    Self {
      selector,
      library_root: library_root.into(),
      rebuild: false,
    }
  }

  pub fn with_rebuild(mut self, rebuild: bool) -> Self {
    self.rebuild = rebuild;
    self
  }
}

/// What a module hands back to whoever asked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolved {
  /// Absolute include directories exported to dependents.
  pub includes: Vec<PathBuf>,
  /// Object files in the module's object directory.
  pub objects: Vec<PathBuf>,
  /// Linked artifact of a project.
  pub output: Option<PathBuf>,
  /// Commands run for this module and everything below it.
  pub commands: usize,
  /// True when nothing ran for this module or any of its dependencies.
  pub skipped: bool,
}

/// Link inputs gathered while walking one dependency tree.
///
/// A fresh accumulator is created for every top-level build, so two builds
/// never see each other's objects or flags.
#[derive(Debug, Default)]
pub struct LinkAccumulator {
  objects: BTreeSet<PathBuf>,
  linker_flags: Vec<String>,
  relink: bool,
}

impl LinkAccumulator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_objects<I>(&mut self, objects: I)
  where
    I: IntoIterator<Item = PathBuf>,
  {
    self.objects.extend(objects);
  }

  pub fn add_linker_flags(&mut self, flags: &[String]) {
    self.linker_flags.extend(flags.iter().cloned());
  }

  /// Record that some module in the tree produced new objects.
  pub fn mark_changed(&mut self) {
    self.relink = true;
  }

  pub fn objects(&self) -> impl Iterator<Item = &Path> {
    self.objects.iter().map(PathBuf::as_path)
  }

  pub fn linker_flags(&self) -> &[String] {
    &self.linker_flags
  }

  pub fn needs_relink(&self) -> bool {
    self.relink
  }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("descriptor '{}' not found", .0.display())]
  DescriptorNotFound(PathBuf),

  #[error(transparent)]
  Descriptor(#[from] DescriptorError),

  #[error(transparent)]
  Glob(#[from] GlobError),

  #[error("invalid command in {}: {source}", path.display())]
  Template {
    path: PathBuf,
    #[source]
    source: TemplateError,
  },

  #[error("no output specified in {}", .0.display())]
  MissingOutput(PathBuf),

  #[error("empty command template in {}", .0.display())]
  MissingCommand(PathBuf),

  #[error("toolchain command failed: {command}")]
  ToolchainFailed {
    command: String,
    #[source]
    source: Option<io::Error>,
  },

  #[error("io error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl BuildError {
  pub(crate) fn io(path: &Path, source: io::Error) -> Self {
    BuildError::Io {
      path: path.to_path_buf(),
      source,
    }
  }
}

impl From<ExecuteError> for BuildError {
  fn from(err: ExecuteError) -> Self {
    match err {
      ExecuteError::Failed { command } => BuildError::ToolchainFailed { command, source: None },
      ExecuteError::Spawn { command, source } => BuildError::ToolchainFailed {
        command,
        source: Some(source),
      },
    }
  }
}
