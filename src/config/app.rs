//! Application configuration structures.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collector::{DEFAULT_QUERY_TIMEOUT, ScrapeOptions, SeriesRetention};

use super::validation::{ConfigError, expand_env_vars};

/// Log filter used when `debug` is off and `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,mssql_exporter=info";

/// Log filter used when `debug` is on and `RUST_LOG` is unset.
pub const DEBUG_LOG_FILTER: &str = "info,mssql_exporter=debug";

fn default_query_timeout() -> Duration {
    DEFAULT_QUERY_TIMEOUT
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Emit per-value fetch traces (default: false).
    ///
    /// Only selects the filter returned by [`AppConfig::log_filter`]. The
    /// traces come from scrapes, so this matters to processes that embed the
    /// crate and drive [`scrape`](crate::scrape); the `check` command never
    /// scrapes.
    #[serde(default)]
    pub debug: bool,

    /// Upper bound for a single collector query (default: 10s).
    #[serde(default = "default_query_timeout", with = "humantime_serde")]
    pub query_timeout: Duration,

    /// Stale label tuple policy (default: keep).
    #[serde(default)]
    pub series_retention: SeriesRetention,

    /// Collectors skipped during scrapes.
    #[serde(default)]
    pub disabled_collectors: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            series_retention: SeriesRetention::Keep,
            disabled_collectors: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "query_timeout must be non-zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.disabled_collectors {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "disabled collector name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate disabled collector: '{}'",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Check that every disabled collector exists.
    pub fn validate_collectors<'a>(
        &self,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        let known: HashSet<&str> = known.into_iter().collect();
        match self
            .disabled_collectors
            .iter()
            .find(|name| !known.contains(name.as_str()))
        {
            Some(unknown) => Err(ConfigError::ValidationError(format!(
                "unknown disabled collector: '{}'",
                unknown
            ))),
            None => Ok(()),
        }
    }

    /// Default tracing filter for this configuration.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }

    /// Scrape settings derived from this configuration.
    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            query_timeout: self.query_timeout,
            retention: self.series_retention,
            disabled: self.disabled_collectors.iter().cloned().collect(),
        }
    }
}
