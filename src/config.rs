// src/config.rs
//! Source configuration
//!
//! The default source list is read from a TOML file:
//!
//! ```toml
//! sources = ["https://packages.example.org/", "file:///srv/mirror"]
//! timeout_secs = 30
//! max_retries = 3
//! ```
//!
//! Lookup order: an explicit path, then `$DEPSOLVE_CONFIG`, then defaults.

use crate::error::{Error, Result};
use crate::source::{self, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RemoteSource, SourceList};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "DEPSOLVE_CONFIG";

/// Source used when no configuration names one
pub const DEFAULT_SOURCE: &str = "https://packages.example.org/";

fn default_sources() -> Vec<String> {
    vec![DEFAULT_SOURCE.to_string()]
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Default source list and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Source URIs in preference order
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per HTTP request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl SourcesConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SourcesConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid sources config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        info!("Loaded sources config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Resolve the config from an explicit path, the environment, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(&PathBuf::from(path)),
            None => {
                debug!("{} not set, using default sources", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Every URI must parse and use a supported scheme
    pub fn validate(&self) -> Result<()> {
        for uri in &self.sources {
            let parsed = Url::parse(uri)
                .map_err(|e| Error::ConfigError(format!("Invalid source URI '{uri}': {e}")))?;
            if !matches!(parsed.scheme(), "file" | "http" | "https") {
                return Err(Error::ConfigError(format!(
                    "Unsupported source scheme '{}' in '{uri}'",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }

    /// Build the default source list, honoring the transport settings
    pub fn into_source_list(self) -> Result<SourceList> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let mut list = SourceList::new();

        for uri in &self.sources {
            let parsed = Url::parse(uri)
                .map_err(|e| Error::ConfigError(format!("Invalid source URI '{uri}': {e}")))?;
            match parsed.scheme() {
                "http" | "https" => list.push(Arc::new(RemoteSource::with_settings(
                    uri,
                    timeout,
                    self.max_retries,
                )?)),
                _ => list.push(source::from_uri(uri)?),
            }
        }

        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config = SourcesConfig::from_toml("").unwrap();
        assert_eq!(config, SourcesConfig::default());
        assert_eq!(config.sources, vec![DEFAULT_SOURCE.to_string()]);
    }

    #[test]
    fn test_parse_full_config() {
        let config = SourcesConfig::from_toml(
            r#"
            sources = ["file:///srv/mirror", "https://packages.example.org/"]
            timeout_secs = 5
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 1);

        let list = config.into_source_list().unwrap();
        let uris: Vec<&str> = list.iter().map(|s| s.uri()).collect();
        assert_eq!(uris, vec!["file:///srv/mirror", "https://packages.example.org/"]);
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let result = SourcesConfig::from_toml(r#"sources = ["ftp://mirror.example.org"]"#);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.toml");
        std::fs::write(&path, "sources = [\"file:///opt/packages\"]\n").unwrap();

        let config = SourcesConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sources, vec!["file:///opt/packages".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = SourcesConfig::load(Some(Path::new("/nonexistent/sources.toml")));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
