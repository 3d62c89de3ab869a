pub mod os;
pub mod paths;

use os::Os;
use std::fmt;
use std::path::PathBuf;

use crate::consts::{CONFIGURATION_ENV, DEFAULT_CONFIGURATION, PLATFORM_ENV};

/// The active platform and configuration names.
///
/// Descriptor conditions such as `[Linux]` or `[!Release]` are evaluated
/// against these two names, and compiled objects are kept apart per
/// `<platform>/<configuration>` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
  pub platform: String,
  pub configuration: String,
}

impl Selector {
  pub fn new(platform: impl Into<String>, configuration: impl Into<String>) -> Self {
    Self {
      platform: platform.into(),
      configuration: configuration.into(),
    }
  }

  /// Detect the active selector from the environment.
  ///
  /// `OREBUILD_PLATFORM` and `OREBUILD_CONFIGURATION` override the detected
  /// OS name and the `Debug` default respectively.
  pub fn detect() -> Self {
    let platform = std::env::var(PLATFORM_ENV).unwrap_or_else(|_| default_platform());
    let configuration = std::env::var(CONFIGURATION_ENV).unwrap_or_else(|_| DEFAULT_CONFIGURATION.to_string());
    Self { platform, configuration }
  }

  /// Apply a `--conf` style override.
  ///
  /// `Release` replaces the configuration, `Linux:Release` replaces both, and
  /// an empty side (`Linux:` or `:Release`) keeps the current value.
  pub fn with_override(mut self, spec: &str) -> Self {
    let (platform, configuration) = match spec.split_once(':') {
      Some((platform, configuration)) => (platform, configuration),
      None => ("", spec),
    };
    if !platform.is_empty() {
      self.platform = platform.to_string();
    }
    if !configuration.is_empty() {
      self.configuration = configuration.to_string();
    }
    self
  }

  /// Returns true if a condition name is satisfied by this selector.
  pub fn matches(&self, condition: &str) -> bool {
    condition == "*" || condition == self.platform || condition == self.configuration
  }

  /// Relative directory that separates artifacts per platform and configuration.
  pub fn artifact_dir(&self) -> PathBuf {
    PathBuf::from(&self.platform).join(&self.configuration)
  }
}

impl Default for Selector {
  fn default() -> Self {
    Self::new(default_platform(), DEFAULT_CONFIGURATION)
  }
}

impl fmt::Display for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.platform, self.configuration)
  }
}

fn default_platform() -> String {
  Os::current()
    .map(|os| os.as_str().to_string())
    .unwrap_or_else(|| std::env::consts::OS.to_string())
}
