//! Configuration and output paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/api-probe/`
//! - macOS: `~/Library/Application Support/api-probe/`
//! - Windows: `%APPDATA%\api-probe\`

use std::path::PathBuf;

/// Application name used for config and data directories
const APP_NAME: &str = "api-probe";

/// File name of the persisted run report
pub const REPORT_FILE: &str = "probe_results.json";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Default location of the run report
///
/// Relative to the working directory so CI jobs can pick it up as an artifact.
pub fn default_report_path() -> PathBuf {
    PathBuf::from(REPORT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
        }
    }

    #[test]
    fn test_default_report_path_is_relative() {
        let path = default_report_path();
        assert!(path.is_relative());
        assert_eq!(path, PathBuf::from("probe_results.json"));
    }
}
