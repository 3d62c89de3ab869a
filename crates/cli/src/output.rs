//! Terminal output for `ore`.
//!
//! Human-readable status lines go to stdout (warnings to stderr), coloured
//! only when the stream supports it. With `--output json` the build report is
//! the only thing written to stdout.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

/// Selected with the global `--output` flag.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Render a build time: `340ms`, `2.05s`, or `3m 12s` past a minute.
pub fn format_duration(duration: Duration) -> String {
  let total = duration.as_secs();
  match total {
    0 => format!("{}ms", duration.subsec_millis()),
    1..=59 => format!("{}.{:02}s", total, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", total / 60, total % 60),
  }
}

/// A finished step, such as a completed build or clone.
pub fn print_success(message: &str) {
  let mark = symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green());
  println!("{mark} {message}");
}

/// Something the user should act on that does not fail the command.
pub fn print_warning(message: &str) {
  let mark = symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow());
  let text = message.if_supports_color(Stream::Stderr, |s| s.yellow());
  eprintln!("{mark} {text}");
}

pub fn print_info(message: &str) {
  let mark = symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue());
  println!("{mark} {message}");
}

/// An indented `label: value` line under a summary.
pub fn print_stat(label: &str, value: &str) {
  let label = label.if_supports_color(Stream::Stdout, |s| s.dimmed());
  println!("  {label}: {value}");
}

/// Pretty-print a serialisable report on stdout.
pub fn print_json<T: serde::Serialize>(report: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
  println!("{json}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn durations_pick_a_unit() {
    assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
    assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    assert_eq!(format_duration(Duration::from_secs(59)), "59.00s");
    assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
  }

  #[test]
  fn output_format_defaults_to_text() {
    assert!(!OutputFormat::default().is_json());
    assert!(OutputFormat::Json.is_json());
  }
}
