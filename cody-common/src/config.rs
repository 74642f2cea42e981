//! Configuration loading
//!
//! The config file location is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `CODYSTATS_CONFIG` environment variable
//! 3. Platform config directory (`<config dir>/codystats/config.toml`)
//!
//! If no file is found, compiled defaults are used. A file that exists but
//! does not parse is an error, not a silent fallback.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file path
pub const CONFIG_ENV_VAR: &str = "CODYSTATS_CONFIG";

/// Reconciler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Base URL of the CodyStats REST backend (schedule, scouted records)
    pub backend_url: String,
    /// Base URL of the external match-result provider
    pub results_url: String,
    /// Competition season year
    pub season: u16,
    /// Optional path to a season field-table TOML (overrides the built-in table)
    pub field_table: Option<PathBuf>,
    /// Per-request timeout for upstream HTTP calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8750".to_string(),
            results_url: "https://frc-api.firstinspires.org/v3.0".to_string(),
            season: 2025,
            field_table: None,
            request_timeout_secs: 30,
        }
    }
}

impl ReconConfig {
    /// Load configuration following the documented priority order
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_file(cli_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&contents)
            }
            None => {
                tracing::debug!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ReconConfig = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend_url.is_empty() {
            return Err(Error::Config("backend_url must not be empty".to_string()));
        }
        if self.results_url.is_empty() {
            return Err(Error::Config("results_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the config file path, if any exists
///
/// Priority: CLI argument, then `CODYSTATS_CONFIG`, then the platform config
/// directory. A CLI/env path is returned whether or not the file exists so a
/// typo surfaces as a read error rather than silently falling back.
fn resolve_config_file(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    let default = dirs::config_dir().map(|d| d.join("codystats").join("config.toml"))?;
    if default.exists() {
        Some(default)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();
        assert_eq!(config.season, 2025);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.field_table.is_none());
    }

    #[test]
    fn test_from_toml_partial_overrides() {
        let config = ReconConfig::from_toml_str(
            r#"
            backend_url = "http://scout.example.org:9000"
            season = 2026
            "#,
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://scout.example.org:9000");
        assert_eq!(config.season, 2026);
        // Unset keys keep defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ReconConfig::from_toml_str("backend_url = [").is_err());
        assert!(ReconConfig::from_toml_str(r#"backend_url = """#).is_err());
        assert!(ReconConfig::from_toml_str("request_timeout_secs = 0").is_err());
    }

    #[test]
    fn test_load_from_cli_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"results_url = "https://results.example.org""#).unwrap();

        let config = ReconConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.results_url, "https://results.example.org");
    }

    #[test]
    fn test_load_missing_cli_path_is_an_error() {
        let result = ReconConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }
}
