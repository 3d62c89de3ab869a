//! Well-known names shared across the crate.

/// Application name, used for data directories and environment variables.
pub const APP_NAME: &str = "orebuild";

/// File name of a link-producing project descriptor (compared case-insensitively).
pub const PROJECT_FILE: &str = "project.orebuild";

/// File name of a library or submodule descriptor.
pub const LIBRARY_FILE: &str = "library.orebuild";

/// Per-module directory holding compiled artifacts.
pub const BUILD_DIR: &str = "build";

/// Suffix appended to a source file name to form its object artifact.
pub const OBJECT_SUFFIX: &str = ".o";

/// Environment variable overriding the library root directory.
pub const LIBRARY_DIR_ENV: &str = "OREBUILD_LIBRARY_DIR";

/// Environment variable overriding the detected platform name.
pub const PLATFORM_ENV: &str = "OREBUILD_PLATFORM";

/// Environment variable overriding the default configuration name.
pub const CONFIGURATION_ENV: &str = "OREBUILD_CONFIGURATION";

/// Configuration selected when none is given.
pub const DEFAULT_CONFIGURATION: &str = "Debug";

/// C compiler used by the default templates.
pub const DEFAULT_COMPILER: &str = "gcc";
