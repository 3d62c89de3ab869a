//! Command templates for toolchain invocations.
//!
//! A template is a shell command with `$name` placeholders, where `name` is a
//! descriptor property (`$include`, `$flags`, `$linkerFlags`, ...) or one of
//! the build bindings `$out` and `$objects`.
//!
//! # Substitution modes
//!
//! - `$name` is replaced by the bound values joined with single spaces.
//! - `*word$name` (or `word*$name`) repeats `word` in front of every value:
//!   `*-I$include` bound to `x y` becomes `-Ix -Iy`.
//!
//! A `$` that is not followed by a known name passes through unchanged, so
//! shell variables like `$HOME` keep working.
//!
//! # Shapes
//!
//! A leading `*` on the whole template selects [`Shape::PerFile`]: the
//! command is instantiated once per source file, with `$files` bound to that
//! file and `$out` to its object. Without it the template is
//! [`Shape::Aggregate`] and produces a single command.
//!
//! # Echo
//!
//! An instantiated command starting with `@` is run without being printed.
//!
//! # Example
//!
//! ```
//! use orebuild_lib::template::{Bindings, Template};
//!
//! let template = Template::parse("cc -c $files -o $out *-I$include");
//! let bindings = Bindings::new()
//!   .with("files", ["a.c"])
//!   .with("out", ["a.o"])
//!   .with("include", ["x", "y"]);
//!
//! let commands = template.instantiate(&bindings).unwrap();
//! assert_eq!(commands[0].command, "cc -c a.c -o a.o -Ix -Iy");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::descriptor::Property;

/// Bindings that exist besides the descriptor properties.
pub const OUT: &str = "out";
pub const OBJECTS: &str = "objects";

/// Placeholders that must appear in a template whenever their binding is non-empty.
const MANDATORY: [&str; 2] = ["include", "files"];

/// How many commands a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
  /// One command covering every input.
  Aggregate,
  /// One command per source file.
  PerFile,
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal command text.
  Literal(String),

  /// A placeholder; `prefix` is set for the repeated `*word$name` form.
  Placeholder { name: String, prefix: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("missing command parameter: ${0}")]
  MissingPlaceholder(String),

  #[error("per-file command needs one output per file, got {files} file(s) and {outs} output(s)")]
  OutputCountMismatch { files: usize, outs: usize },
}

/// Values bound to placeholder names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
  values: BTreeMap<String, Vec<String>>,
}

impl Bindings {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind `name`, replacing any earlier values.
  pub fn set<I, S>(&mut self, name: &str, values: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self
      .values
      .insert(name.to_string(), values.into_iter().map(Into::into).collect());
    self
  }

  /// Builder form of [`Bindings::set`].
  pub fn with<I, S>(mut self, name: &str, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.set(name, values);
    self
  }

  /// Values bound to `name`; empty if unbound.
  pub fn get(&self, name: &str) -> &[String] {
    self.values.get(name).map(Vec::as_slice).unwrap_or_default()
  }
}

/// A concrete command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub command: String,
  /// Whether the command line is printed before it runs.
  pub echo: bool,
}

impl Invocation {
  /// Build an invocation, honouring a leading `@`.
  pub fn new(line: &str) -> Self {
    match line.strip_prefix('@') {
      Some(quiet) => Self {
        command: quiet.to_string(),
        echo: false,
      },
      None => Self {
        command: line.to_string(),
        echo: true,
      },
    }
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.command)
  }
}

/// A parsed command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  shape: Shape,
  segments: Vec<Segment>,
}

impl Template {
  /// Parse template text. Parsing cannot fail; unknown `$words` stay literal.
  pub fn parse(text: &str) -> Self {
    let (shape, body) = match text.strip_prefix('*') {
      Some(rest) => (Shape::PerFile, rest),
      None => (Shape::Aggregate, text),
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = body;

    while let Some(dollar) = rest.find('$') {
      literal.push_str(&rest[..dollar]);
      let after = &rest[dollar + 1..];
      let len = after.bytes().take_while(u8::is_ascii_alphabetic).count();
      let name = &after[..len];
      rest = &after[len..];

      if !is_known(name) {
        literal.push('$');
        literal.push_str(name);
        continue;
      }

      let start = literal.rfind(' ').map_or(0, |space| space + 1);
      let word = &literal[start..];
      let prefix = word
        .strip_prefix('*')
        .or_else(|| word.strip_suffix('*'))
        .map(str::to_string);
      if prefix.is_some() {
        literal.truncate(start);
      }

      if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
      }
      segments.push(Segment::Placeholder {
        name: name.to_string(),
        prefix,
      });
    }

    literal.push_str(rest);
    if !literal.is_empty() {
      segments.push(Segment::Literal(literal));
    }

    Self { shape, segments }
  }

  pub fn shape(&self) -> Shape {
    self.shape
  }

  /// Returns true if the template has a placeholder for `name`.
  pub fn mentions(&self, name: &str) -> bool {
    self
      .segments
      .iter()
      .any(|segment| matches!(segment, Segment::Placeholder { name: n, .. } if n == name))
  }

  /// Append ` $name` to the end of the template.
  pub fn append(mut self, name: &str) -> Self {
    self.segments.push(Segment::Literal(" ".to_string()));
    self.segments.push(Segment::Placeholder {
      name: name.to_string(),
      prefix: None,
    });
    self
  }

  /// Expand the template into concrete commands.
  ///
  /// Aggregate templates yield exactly one command. Per-file templates yield
  /// one command per value of `files`, pairing it with the value of `out` at
  /// the same position.
  ///
  /// # Errors
  ///
  /// Fails if `include` or `files` is bound to something but the template
  /// has no placeholder for it, or if a per-file template gets a different
  /// number of files and outputs.
  pub fn instantiate(&self, bindings: &Bindings) -> Result<Vec<Invocation>, TemplateError> {
    for name in MANDATORY {
      if !bindings.get(name).is_empty() && !self.mentions(name) {
        return Err(TemplateError::MissingPlaceholder(name.to_string()));
      }
    }

    match self.shape {
      Shape::Aggregate => Ok(vec![Invocation::new(&self.render(bindings))]),
      Shape::PerFile => {
        let files = bindings.get("files");
        let outs = bindings.get(OUT);
        if files.len() != outs.len() {
          return Err(TemplateError::OutputCountMismatch {
            files: files.len(),
            outs: outs.len(),
          });
        }

        let mut single = bindings.clone();
        Ok(
          files
            .iter()
            .zip(outs)
            .map(|(file, out)| {
              single.set("files", [file.as_str()]).set(OUT, [out.as_str()]);
              Invocation::new(&self.render(&single))
            })
            .collect(),
        )
      }
    }
  }

  fn render(&self, bindings: &Bindings) -> String {
    let mut result = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => result.push_str(text),
        Segment::Placeholder { name, prefix } => {
          let values = bindings.get(name);
          match prefix {
            Some(prefix) => {
              let repeated: Vec<String> = values.iter().map(|v| format!("{prefix}{v}")).collect();
              result.push_str(&repeated.join(" "));
            }
            None => result.push_str(&values.join(" ")),
          }
        }
      }
    }
    result.trim_end().to_string()
  }
}

fn is_known(name: &str) -> bool {
  name == OUT || name == OBJECTS || Property::from_name(name).is_some()
}
