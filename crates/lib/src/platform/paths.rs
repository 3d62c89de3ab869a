use crate::consts::{APP_NAME, LIBRARY_DIR_ENV};
use std::path::PathBuf;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var_os("USERPROFILE").map(PathBuf::from).unwrap_or_default()
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default()
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var_os("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(home_dir)
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Returns the root directory holding installed libraries.
///
/// `OREBUILD_LIBRARY_DIR` takes precedence over the data directory.
pub fn library_dir() -> PathBuf {
  if let Some(path) = std::env::var_os(LIBRARY_DIR_ENV) {
    return PathBuf::from(path);
  }
  data_dir().join("libraries")
}

#[cfg(test)]
#[cfg(not(windows))]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn library_dir_env_takes_precedence() {
    temp_env::with_vars(
      [
        (LIBRARY_DIR_ENV, Some("/opt/ore/libs")),
        ("XDG_DATA_HOME", Some("/custom/data")),
      ],
      || {
        assert_eq!(library_dir(), PathBuf::from("/opt/ore/libs"));
      },
    );
  }

  #[test]
  #[serial]
  fn library_dir_defaults_to_data_dir() {
    temp_env::with_vars(
      [
        (LIBRARY_DIR_ENV, None::<&str>),
        ("XDG_DATA_HOME", None::<&str>),
        ("HOME", Some("/home/user")),
      ],
      || {
        assert_eq!(
          library_dir(),
          PathBuf::from("/home/user/.local/share").join(APP_NAME).join("libraries")
        );
      },
    );
  }
}
