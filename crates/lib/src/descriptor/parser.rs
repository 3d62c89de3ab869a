use std::collections::BTreeSet;

use tracing::trace;

use super::{Descriptor, DescriptorError, ParseErrorKind, Property};
use crate::platform::Selector;

/// Single-pass reader over descriptor text.
struct Parser<'a> {
  source: &'a str,
  bytes: &'a [u8],
  pos: usize,
}

pub(super) fn parse(source: &str, origin: &str, selector: &Selector) -> Result<Descriptor, DescriptorError> {
  let mut parser = Parser {
    source,
    bytes: source.as_bytes(),
    pos: 0,
  };

  parser.run(selector).map_err(|(pos, kind)| DescriptorError::Parse {
    origin: origin.to_string(),
    line: line_at(source, pos),
    kind,
  })
}

/// 1-based line containing byte offset `pos`.
fn line_at(source: &str, pos: usize) -> usize {
  let end = pos.min(source.len());
  source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

type Failure = (usize, ParseErrorKind);

impl<'a> Parser<'a> {
  fn run(&mut self, selector: &Selector) -> Result<Descriptor, Failure> {
    let mut descriptor = Descriptor::default();
    let mut declared = BTreeSet::new();
    let mut region_ignored = false;

    loop {
      self.skip_whitespace();
      if self.at_end() {
        break;
      }
      if self.bytes[self.pos..].starts_with(b"//") {
        self.skip_line();
        continue;
      }

      let mut statement_ignored = false;
      if self.peek() == Some(b'[') {
        let active = self.condition(selector)?;
        if self.eat(b':') {
          statement_ignored = !active;
          self.skip_whitespace();
        } else {
          region_ignored = !active;
          continue;
        }
      }

      let start = self.pos;
      let name = self.word().ok_or((start, ParseErrorKind::ExpectedName))?;
      let property =
        Property::from_name(name).ok_or_else(|| (start, ParseErrorKind::InvalidProperty(name.to_string())))?;

      self.skip_whitespace();
      if self.eat(b':') {
        self.skip_whitespace();
      }
      let raw = self.string()?;
      self.skip_whitespace();
      if !self.eat(b';') {
        return Err((self.pos, ParseErrorKind::MissingSemicolon));
      }

      if region_ignored || statement_ignored {
        trace!(property = property.name(), "statement excluded by condition");
        continue;
      }

      let value = if property.is_template() {
        raw.to_string()
      } else {
        interpolate(raw, &descriptor, &declared)
      };
      descriptor.insert(property, value).map_err(|kind| (start, kind))?;
      declared.insert(property);
    }

    for property in Property::ALL {
      if !declared.contains(&property) {
        descriptor.apply_default(property);
      }
    }
    Ok(descriptor)
  }

  /// `[` `!`? (name | `*`) `]`, returning whether the condition holds.
  fn condition(&mut self, selector: &Selector) -> Result<bool, Failure> {
    let source = self.source;
    self.pos += 1;
    let expect = !self.eat(b'!');
    self.skip_whitespace();

    let start = self.pos;
    let name = if self.eat(b'*') {
      "*"
    } else {
      while self
        .peek()
        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
      {
        self.pos += 1;
      }
      &source[start..self.pos]
    };
    if name.is_empty() {
      return Err((start, ParseErrorKind::ExpectedCondition));
    }

    self.skip_whitespace();
    if !self.eat(b']') {
      return Err((self.pos, ParseErrorKind::ExpectedBracket));
    }
    Ok(selector.matches(name) == expect)
  }

  fn word(&mut self) -> Option<&'a str> {
    let source = self.source;
    let start = self.pos;
    while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
      self.pos += 1;
    }
    (self.pos > start).then(|| &source[start..self.pos])
  }

  /// A double-quoted string that must close on the same line.
  fn string(&mut self) -> Result<&'a str, Failure> {
    let source = self.source;
    if !self.eat(b'"') {
      return Err((self.pos, ParseErrorKind::ExpectedString));
    }
    let start = self.pos;
    loop {
      match self.peek() {
        Some(b'"') => {
          let value = &source[start..self.pos];
          self.pos += 1;
          return Ok(value);
        }
        Some(b'\n') | None => return Err((self.pos, ParseErrorKind::UnterminatedString)),
        Some(_) => self.pos += 1,
      }
    }
  }

  fn peek(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn eat(&mut self, expected: u8) -> bool {
    if self.peek() == Some(expected) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn at_end(&self) -> bool {
    self.pos >= self.bytes.len()
  }

  fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
      self.pos += 1;
    }
  }

  fn skip_line(&mut self) {
    while let Some(b) = self.peek() {
      self.pos += 1;
      if b == b'\n' {
        break;
      }
    }
  }
}

/// Replace `$name` with the first value of an already declared property.
fn interpolate(raw: &str, descriptor: &Descriptor, declared: &BTreeSet<Property>) -> String {
  let mut result = String::with_capacity(raw.len());
  let mut rest = raw;

  while let Some(dollar) = rest.find('$') {
    result.push_str(&rest[..dollar]);
    let after = &rest[dollar + 1..];
    let len = after.bytes().take_while(u8::is_ascii_alphabetic).count();
    let name = &after[..len];

    match Property::from_name(name).filter(|p| declared.contains(p)) {
      Some(property) => result.push_str(descriptor.first(property).unwrap_or("")),
      None => {
        result.push('$');
        result.push_str(name);
      }
    }
    rest = &after[len..];
  }

  result.push_str(rest);
  result
}
