//! Configuration module for the exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Diagnostic tracing (`debug`)
//! - Query timeout and stale series policy
//! - Disabled collectors

mod app;
mod validation;

pub use app::{AppConfig, DEBUG_LOG_FILTER, DEFAULT_LOG_FILTER};
pub use validation::{ConfigError, expand_env_vars};
