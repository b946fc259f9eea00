//! Pipeline configuration loader.
//!
//! This module provides functionality to load the pipeline configuration
//! from JSON files or default locations, falling back to built-in defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of entries taken from each site list.
pub const DEFAULT_LIST_N: usize = 10;

/// Everything a pipeline run needs to know about its inputs and outputs.
///
/// Every field has a default, so a config file only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directories scanned for measurement files
    pub input_dirs: Vec<PathBuf>,
    /// Glob pattern of DNS lookup logs
    pub dns_pattern: String,
    /// Glob pattern of page-load logs
    pub web_pattern: String,
    /// Ordered list of popular sites, one per line
    pub popular_sites: PathBuf,
    /// Ordered list of unpopular sites, one per line
    pub unpopular_sites: PathBuf,
    /// How many popular sites lead the per-site order
    pub popular_n: usize,
    /// How many unpopular sites follow them
    pub unpopular_n: usize,
    /// Where tables and charts are written
    pub out_dir: PathBuf,
    /// Whether to render charts
    pub charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dirs: vec![
                PathBuf::from("new_data/raw"),
                PathBuf::from("new_data/unpop_raw"),
            ],
            dns_pattern: "*_dns_*.csv".to_string(),
            web_pattern: "*_web_*.csv".to_string(),
            popular_sites: PathBuf::from("config/sites.txt"),
            unpopular_sites: PathBuf::from("config/unpopular_sites.txt"),
            popular_n: DEFAULT_LIST_N,
            unpopular_n: DEFAULT_LIST_N,
            out_dir: PathBuf::from("new_fig"),
            charts: true,
        }
    }
}

impl PipelineConfig {
    /// Check the configuration for values no run can work with.
    ///
    /// # Errors
    ///
    /// Returns a config error for an empty directory list or pattern.
    pub fn validate(&self) -> Result<()> {
        if self.input_dirs.is_empty() {
            return Err(Error::config("at least one input directory is required"));
        }
        if self.dns_pattern.trim().is_empty() {
            return Err(Error::config("dns_pattern must not be empty"));
        }
        if self.web_pattern.trim().is_empty() {
            return Err(Error::config("web_pattern must not be empty"));
        }
        Ok(())
    }
}

/// Pipeline configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The result is
    /// not validated; call [`PipelineConfig::validate`] once overrides are in.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = ConfigLoader::load_from_file("dnsstat.json")?;
    /// println!("{} input dirs", config.input_dirs.len());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the configuration from the default locations.
    ///
    /// Searches in the following order:
    /// 1. `$CONFIG_DIR/dnsstat/config.json`
    /// 2. `dnsstat.json` in current directory
    ///
    /// Falls back to [`PipelineConfig::default`] when neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load_default() -> Result<PipelineConfig> {
        let candidates = [
            Self::config_dir().join("config.json"),
            PathBuf::from("dnsstat.json"),
        ];
        for path in candidates {
            if path.is_file() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load_from_file(&path);
            }
        }
        tracing::debug!("No config file found, using defaults");
        Ok(PipelineConfig::default())
    }

    /// Load from an explicit path if given, otherwise from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnsstat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_dirs.len(), 2);
        assert_eq!(config.dns_pattern, "*_dns_*.csv");
        assert_eq!(config.popular_n, 10);
        assert_eq!(config.unpopular_n, 10);
        assert!(config.charts);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnsstat.json");
        std::fs::write(&path, r#"{"input_dirs": ["logs"], "popular_n": 3}"#).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.input_dirs, vec![PathBuf::from("logs")]);
        assert_eq!(config.popular_n, 3);
        assert_eq!(config.unpopular_n, 10);
        assert_eq!(config.out_dir, PathBuf::from("new_fig"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"input_dirs": []}"#).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.json");
        let result = ConfigLoader::load(Some(absent.as_path()));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
