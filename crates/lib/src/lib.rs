//! orebuild-lib: Core logic for orebuild
//!
//! This crate provides the pieces of an incremental native-code build:
//! - `descriptor`: parsing of `project.orebuild` / `library.orebuild` files
//! - `glob`: wildcard source discovery
//! - `build`: dependency resolution, staleness checks and linking
//! - `template`: command templates for compiler and linker invocations
//! - `execute`: running those commands
//! - `package`: searching for and installing libraries

pub mod build;
pub mod consts;
pub mod descriptor;
pub mod execute;
pub mod glob;
pub mod package;
pub mod platform;
pub mod template;
pub mod util;
