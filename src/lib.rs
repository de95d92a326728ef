//! mssql-exporter - SQL Server query-to-gauge mapping
//!
//! This crate maps the result sets of a fixed set of SQL Server queries onto
//! Prometheus gauges. Query execution, HTTP serving and scheduling belong to
//! the embedding process; the crate consumes a [`QueryExecutor`] and fills an
//! [`Exposition`] sink.
//!
//! # Architecture
//!
//! - **Exposition**: Gauge registration, value handles, text rendering
//! - **Collectors**: Declarative query/column/measurement bindings and the scrape cycle
//! - **Docs**: DBA-facing rendering of every query and the series it feeds
//! - **Config**: YAML settings for tracing, timeouts and stale series policy
//!
//! # Example
//!
//! ```rust,no_run
//! use mssql_exporter::{CollectorRegistry, Exposition, docs};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sink = Exposition::new();
//! let registry = CollectorRegistry::new(&mut sink)?;
//! print!("{}", docs::render_documentation(&registry));
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod docs;
pub mod exposition;

pub use collector::{
    CollectError, CollectorDefinition, CollectorOutcome, CollectorRegistry, CollectorSpec,
    QueryError, QueryExecutor, Row, ScrapeOptions, ScrapeReport, SeriesRetention, Value, scrape,
};
pub use config::{AppConfig, ConfigError};
pub use exposition::{
    ContractError, Exposition, Measurement, MeasurementDescriptor, RegistryError,
};
