//! Configuration errors and text preprocessing.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(&caps[1]).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("query_timeout: 5s"), "query_timeout: 5s");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        let result = expand_env_vars("series_retention: ${NONEXISTENT_RETENTION_12345:-clear}");
        assert_eq!(result, "series_retention: clear");
    }

    #[test]
    fn test_expand_env_vars_missing_without_default() {
        assert_eq!(expand_env_vars("x${NONEXISTENT_VAR_67890}y"), "xy");
    }

    #[test]
    fn test_expand_env_vars_from_env() {
        // SAFETY: This test runs in isolation and only modifies a test-specific variable.
        unsafe {
            std::env::set_var("MSSQL_EXPORTER_TEST_TIMEOUT", "30s");
        }
        let result = expand_env_vars("query_timeout: ${MSSQL_EXPORTER_TEST_TIMEOUT}");
        assert_eq!(result, "query_timeout: 30s");
        // SAFETY: Cleanup test variable.
        unsafe {
            std::env::remove_var("MSSQL_EXPORTER_TEST_TIMEOUT");
        }
    }
}
