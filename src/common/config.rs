//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{config_path, default_report_path};
use super::Result;
use crate::catalog::Suite;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Run settings
    #[serde(default)]
    pub run: RunConfig,
}

/// Remote API settings
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to, e.g. `https://host/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Append `demo=true` to every request so the service skips authentication
    #[serde(default = "default_demo")]
    pub demo: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            demo: default_demo(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_demo() -> bool {
    true
}

/// Run settings
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Suite to run when none is given on the command line
    #[serde(default)]
    pub suite: Suite,

    /// Pause between consecutive steps, in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Where the JSON report is written
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            suite: Suite::default(),
            pause_ms: default_pause_ms(),
            report_path: default_report_path(),
        }
    }
}

fn default_pause_ms() -> u64 {
    500
}

impl RunConfig {
    /// Pause between steps as a Duration
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Check settings that would otherwise fail every request of a run
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            super::Error::Config(format!("invalid base_url '{}': {e}", self.api.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(super::Error::Config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        // Request paths are appended to the base URL, so it must end in a path
        if url.query().is_some() || url.fragment().is_some() {
            return Err(super::Error::Config(format!(
                "base_url must not carry a query or fragment: '{}'",
                self.api.base_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert!(config.api.demo);
        assert_eq!(config.run.suite, Suite::Full);
        assert_eq!(config.run.pause(), Duration::from_millis(500));
        assert_eq!(config.run.report_path, PathBuf::from("probe_results.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://studio.example.com/api"

            [run]
            suite = "workflow"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://studio.example.com/api");
        assert!(config.api.demo);
        assert_eq!(config.run.suite, Suite::Workflow);
        assert_eq!(config.run.pause_ms, 500);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[run]\npause_ms = \"soon\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, super::super::Error::ConfigParse(_)));
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api.base_url = "localhost:3000/api".to_string();
        assert!(matches!(config.validate(), Err(super::super::Error::Config(_))));

        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(super::super::Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_query_and_fragment() {
        let mut config = Config::default();
        for base_url in ["https://studio.test/api?tenant=a", "https://studio.test/api#v2"] {
            config.api.base_url = base_url.to_string();
            let err = config.validate().unwrap_err();
            assert!(matches!(err, super::super::Error::Config(_)), "{base_url}");
            assert!(err.to_string().contains("query or fragment"));
        }

        config.api.base_url = "https://studio.test/api/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, super::super::Error::FileRead { .. }));
    }
}
