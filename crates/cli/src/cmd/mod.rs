mod build;
mod install;
mod run;
mod search;

use std::path::PathBuf;

use orebuild_lib::platform::Selector;

use crate::output::OutputFormat;

pub use build::cmd_build;
pub use install::cmd_install;
pub use run::cmd_run;
pub use search::cmd_search;

/// Settings resolved from global flags, the environment and defaults.
pub struct Settings {
  pub selector: Selector,
  pub library_root: PathBuf,
  pub format: OutputFormat,
  pub verbose: bool,
}
