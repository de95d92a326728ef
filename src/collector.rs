//! Collector Layer
//!
//! Declarative collectors that map SQL Server query results onto gauges.
//! Each collector pairs one static query and its expected columns with the
//! measurements it feeds and a row mapper.
//!
//! # Architecture
//!
//! - [`CollectorSpec`]: Static declaration (query, columns, descriptors, mapper)
//! - [`CollectorDefinition`]: A spec bound to registered measurement handles
//! - [`CollectorRegistry`]: Ordered collector list plus the `up` gauge
//! - [`QueryExecutor`]: Database capability consumed by [`scrape`]
//!
//! # Example
//!
//! ```rust,no_run
//! use mssql_exporter::{CollectorRegistry, Exposition, ScrapeOptions, scrape};
//! # async fn run(executor: &dyn mssql_exporter::QueryExecutor) -> Result<(), Box<dyn std::error::Error>> {
//! let mut sink = Exposition::new();
//! let registry = CollectorRegistry::new(&mut sink)?;
//! let report = scrape(&registry, executor, &ScrapeOptions::default()).await;
//! println!("up={} {}", report.is_up(), sink.render()?);
//! # Ok(())
//! # }
//! ```

mod definition;
pub mod mssql;
mod registry;
mod row;
mod scrape;
mod traits;

pub use definition::{
    CollectError, CollectReport, CollectorDefinition, CollectorSpec, Measurements, RowMapper,
    RowShape, SeriesRetention, Update, ValueFailure,
};
pub use registry::{CollectorRegistry, UP};
pub use row::{CoercionError, Row, Value};
pub use scrape::{
    CollectorOutcome, CollectorRun, DEFAULT_QUERY_TIMEOUT, ScrapeOptions, ScrapeReport, scrape,
};
pub use traits::{QueryError, QueryExecutor};
