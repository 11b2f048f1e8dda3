//! Unified path management for assistant files.
//!
//! Directories are resolved through `AppPaths` from version-migrate, which
//! follows the platform conventions (XDG on Linux, `AppData` on Windows).

use std::path::PathBuf;
use version_migrate::AppPaths;

/// Application directory name below the platform config/data roots.
pub const APP_DIR_NAME: &str = "gemma-assistant";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for the assistant.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/gemma-assistant/       # Config directory
/// ├── config.toml                  # Application configuration
/// └── logs/                        # Application logs
///     └── gemma.log.YYYY-MM-DD
///
/// ~/.local/share/gemma-assistant/  # Data directory
/// └── chats.json                   # All chat topics
/// ```
pub struct GemmaPaths;

impl GemmaPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new(APP_DIR_NAME)
    }

    /// Returns the configuration directory (e.g., `~/.config/gemma-assistant/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g., `~/.local/share/gemma-assistant/`).
    ///
    /// `chats.json` lives here unless `storage.data_dir` overrides it.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding rolling log files.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
