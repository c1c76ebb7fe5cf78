//! Unified path management for aeroplan configuration files.
//!
//! ```text
//! ~/.config/aeroplan/          # Config directory (platform default via `dirs`)
//! └── config.toml              # Application configuration
//! ```
//!
//! Generated artifacts (`static/`, `plans/`) live relative to the working
//! directory and are configured in `[artifacts]`, not here.

use std::path::PathBuf;

const APP_NAME: &str = "aeroplan";

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

pub struct AeroplanPaths;

impl AeroplanPaths {
    /// Returns the aeroplan configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/aeroplan/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_under_app_dir() {
        if let Ok(path) = AeroplanPaths::config_file() {
            assert!(path.ends_with("aeroplan/config.toml"));
        }
    }
}
