mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use orebuild_lib::platform::{Selector, paths};

use crate::cmd::Settings;
use crate::output::OutputFormat;

/// ore - incremental builds for C and C++ projects
#[derive(Parser)]
#[command(name = "ore")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Configuration to build, as `Configuration` or `Platform:Configuration`
  #[arg(long, global = true, value_name = "SELECTOR")]
  conf: Option<String>,

  /// Directory holding installed libraries
  #[arg(long, global = true, value_name = "DIR")]
  libraries: Option<PathBuf>,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the project in a directory
  Build {
    /// Project directory or descriptor (default: current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,
  },

  /// Rebuild everything, ignoring timestamps
  Rebuild {
    /// Project directory or descriptor (default: current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,
  },

  /// Build the project, then run its output
  Run {
    /// Project directory or descriptor (default: current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Arguments passed to the program
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Search GitHub for C and C++ libraries
  Search {
    /// Search terms
    query: String,
  },

  /// Install a library from GitHub into the library directory
  Install {
    /// Repository as OWNER/REPO
    name: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let mut selector = Selector::detect();
  if let Some(conf) = &cli.conf {
    selector = selector.with_override(conf);
  }
  let settings = Settings {
    selector,
    library_root: cli.libraries.unwrap_or_else(paths::library_dir),
    format: cli.output,
    verbose: cli.verbose,
  };

  match cli.command {
    Commands::Build { dir } => cmd::cmd_build(&dir, false, &settings).map(|_| ()),
    Commands::Rebuild { dir } => cmd::cmd_build(&dir, true, &settings).map(|_| ()),
    Commands::Run { dir, args } => {
      let code = cmd::cmd_run(&dir, &args, &settings)?;
      if code != 0 {
        std::process::exit(code);
      }
      Ok(())
    }
    Commands::Search { query } => cmd::cmd_search(&query, &settings),
    Commands::Install { name } => cmd::cmd_install(&name, &settings),
  }
}
