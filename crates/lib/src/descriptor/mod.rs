//! Build descriptors.
//!
//! A descriptor is a small declarative file, one per module or library:
//!
//! ```text
//! // comment
//! files "src/**.cpp";
//! path "game";
//! [Windows]: linkerFlags "-lgdi32";
//! [Release]
//! flags "-O2";
//! [*]
//! output "bin/$path";
//! ```
//!
//! Each statement names a property from a fixed vocabulary and gives it a
//! double-quoted value. A bracketed condition followed by `:` guards only the
//! next statement; a bare condition switches a region on or off until the next
//! bare condition. See [`parse_str`] for the details.

mod parser;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::platform::Selector;

/// The fixed property vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
  Library,
  Include,
  Files,
  Watch,
  Output,
  Flags,
  LinkerFlags,
  Compiler,
  Command,
  SubmoduleCommand,
  Path,
  Submodule,
}

impl Property {
  pub const ALL: [Property; 12] = [
    Property::Library,
    Property::Include,
    Property::Files,
    Property::Watch,
    Property::Output,
    Property::Flags,
    Property::LinkerFlags,
    Property::Compiler,
    Property::Command,
    Property::SubmoduleCommand,
    Property::Path,
    Property::Submodule,
  ];

  /// The name as written in a descriptor.
  pub fn name(self) -> &'static str {
    match self {
      Property::Library => "library",
      Property::Include => "include",
      Property::Files => "files",
      Property::Watch => "watch",
      Property::Output => "output",
      Property::Flags => "flags",
      Property::LinkerFlags => "linkerFlags",
      Property::Compiler => "compiler",
      Property::Command => "command",
      Property::SubmoduleCommand => "submoduleCommand",
      Property::Path => "path",
      Property::Submodule => "submodule",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|p| p.name() == name)
  }

  /// Command templates keep their `$name` placeholders for instantiation time.
  pub fn is_template(self) -> bool {
    matches!(self, Property::Command | Property::SubmoduleCommand)
  }
}

/// A parsed descriptor, one field per property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
  pub library: Vec<String>,
  pub include: Vec<String>,
  pub files: Vec<String>,
  pub watch: Vec<String>,
  pub output: Option<String>,
  pub flags: Vec<String>,
  pub linker_flags: Vec<String>,
  pub compiler: Option<String>,
  pub command: Option<String>,
  pub submodule_command: Option<String>,
  pub path: Option<String>,
  pub submodule: Vec<String>,
}

impl Descriptor {
  /// All values of a property, in declaration order.
  pub fn values(&self, property: Property) -> &[String] {
    match property {
      Property::Library => &self.library,
      Property::Include => &self.include,
      Property::Files => &self.files,
      Property::Watch => &self.watch,
      Property::Output => self.output.as_slice(),
      Property::Flags => &self.flags,
      Property::LinkerFlags => &self.linker_flags,
      Property::Compiler => self.compiler.as_slice(),
      Property::Command => self.command.as_slice(),
      Property::SubmoduleCommand => self.submodule_command.as_slice(),
      Property::Path => self.path.as_slice(),
      Property::Submodule => &self.submodule,
    }
  }

  /// The first value of a property, if any.
  pub fn first(&self, property: Property) -> Option<&str> {
    self.values(property).first().map(String::as_str)
  }

  /// Where a property's values live. Multi-valued properties split their
  /// value on whitespace and accumulate across repeated statements; the
  /// others may be assigned once.
  fn slot(&mut self, property: Property) -> Slot<'_> {
    match property {
      Property::Library => Slot::Multi(&mut self.library),
      Property::Include => Slot::Multi(&mut self.include),
      Property::Files => Slot::Multi(&mut self.files),
      Property::Watch => Slot::Multi(&mut self.watch),
      Property::Flags => Slot::Multi(&mut self.flags),
      Property::LinkerFlags => Slot::Multi(&mut self.linker_flags),
      Property::Submodule => Slot::Multi(&mut self.submodule),
      Property::Output => Slot::Single(&mut self.output),
      Property::Compiler => Slot::Single(&mut self.compiler),
      Property::Command => Slot::Single(&mut self.command),
      Property::SubmoduleCommand => Slot::Single(&mut self.submodule_command),
      Property::Path => Slot::Single(&mut self.path),
    }
  }

  fn insert(&mut self, property: Property, value: String) -> Result<(), ParseErrorKind> {
    match self.slot(property) {
      Slot::Multi(list) => list.extend(value.split_whitespace().map(str::to_string)),
      Slot::Single(Some(_)) => return Err(ParseErrorKind::RepeatedProperty(property.name().to_string())),
      Slot::Single(single) => *single = Some(value),
    }
    Ok(())
  }

  /// Fill in undeclared properties that have documented defaults.
  fn apply_default(&mut self, property: Property) {
    let (list, defaults): (&mut Vec<String>, &[&str]) = match property {
      Property::Include => (&mut self.include, &["."][..]),
      Property::Files => (&mut self.files, &["src/**.cpp"][..]),
      Property::Watch => (&mut self.watch, &["src/**.h", "src/**.hpp"][..]),
      _ => return,
    };
    *list = defaults.iter().map(|s| s.to_string()).collect();
  }
}

enum Slot<'a> {
  Single(&'a mut Option<String>),
  Multi(&'a mut Vec<String>),
}

/// What went wrong while reading descriptor syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
  #[error("expected property name")]
  ExpectedName,

  #[error("invalid property: {0}")]
  InvalidProperty(String),

  #[error("expected configuration or platform name")]
  ExpectedCondition,

  #[error("expected ']'")]
  ExpectedBracket,

  #[error("expected property value as double-quoted string")]
  ExpectedString,

  #[error("unterminated string")]
  UnterminatedString,

  #[error("missing semicolon")]
  MissingSemicolon,

  #[error("repeating property: {0}")]
  RepeatedProperty(String),
}

/// Errors produced while loading a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("failed to read descriptor {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("error at around {origin}:{line}: {kind}")]
  Parse {
    origin: String,
    line: usize,
    kind: ParseErrorKind,
  },
}

impl DescriptorError {
  /// The parse failure, if this is a syntax error.
  pub fn kind(&self) -> Option<&ParseErrorKind> {
    match self {
      DescriptorError::Parse { kind, .. } => Some(kind),
      DescriptorError::Read { .. } => None,
    }
  }

  /// 1-based line of a syntax error.
  pub fn line(&self) -> Option<usize> {
    match self {
      DescriptorError::Parse { line, .. } => Some(*line),
      DescriptorError::Read { .. } => None,
    }
  }
}

/// Parse a descriptor file.
pub fn parse_file(path: &Path, selector: &Selector) -> Result<Descriptor, DescriptorError> {
  let source = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parser::parse(&source, &path.display().to_string(), selector)
}

/// Parse descriptor text.
///
/// Statements whose condition does not hold for `selector` are dropped
/// entirely. Before a value is stored, `$name` is replaced by the first value
/// of property `name` if it was declared by an earlier statement; later
/// declarations are not visible. `command` and `submoduleCommand` are kept
/// verbatim.
///
/// After the whole text is read, undeclared `include`, `files` and `watch`
/// receive their defaults (`.`, `src/**.cpp`, `src/**.h src/**.hpp`).
pub fn parse_str(source: &str, selector: &Selector) -> Result<Descriptor, DescriptorError> {
  parser::parse(source, "<descriptor>", selector)
}
