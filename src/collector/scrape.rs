//! One scrape cycle: run every enabled collector and record the outcome.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::collector::{
    CollectError, CollectReport, CollectorDefinition, CollectorRegistry, QueryError,
    QueryExecutor, SeriesRetention,
};

/// Default per-query timeout (10 seconds).
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings applied to every collector of a scrape.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Upper bound for one query's execution.
    pub query_timeout: Duration,
    /// Stale label tuple policy.
    pub retention: SeriesRetention,
    /// Collector names to skip.
    pub disabled: BTreeSet<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            retention: SeriesRetention::Keep,
            disabled: BTreeSet::new(),
        }
    }
}

/// What happened to one collector during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorOutcome {
    /// Rows were mapped; individual values may still have failed coercion.
    Applied(CollectReport),
    /// Singleton collector got no rows; previous values retained.
    SkippedEmpty,
    /// Collector is disabled by configuration.
    Disabled,
    /// The executor failed; the collector was not touched.
    QueryFailed(QueryError),
    /// Mapping aborted (schema mismatch or contract violation).
    CollectFailed(CollectError),
}

/// One collector's result within a scrape.
#[derive(Debug, Clone)]
pub struct CollectorRun {
    pub collector: &'static str,
    pub outcome: CollectorOutcome,
    pub duration: Duration,
}

/// Result of a full scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub runs: Vec<CollectorRun>,
}

impl ScrapeReport {
    /// `true` unless some query failed at the executor.
    pub fn is_up(&self) -> bool {
        !self
            .runs
            .iter()
            .any(|r| matches!(r.outcome, CollectorOutcome::QueryFailed(_)))
    }

    /// Collectors whose cycle was aborted (query or mapping failure).
    pub fn failed(&self) -> impl Iterator<Item = &CollectorRun> {
        self.runs.iter().filter(|r| {
            matches!(
                r.outcome,
                CollectorOutcome::QueryFailed(_) | CollectorOutcome::CollectFailed(_)
            )
        })
    }

    pub fn outcome(&self, collector: &str) -> Option<&CollectorOutcome> {
        self.runs
            .iter()
            .find(|r| r.collector == collector)
            .map(|r| &r.outcome)
    }
}

/// Run every enabled collector in registry order and set `up`.
///
/// Failures stay local to their collector: siblings still run and previously
/// exposed values remain in place.
pub async fn scrape<E>(
    registry: &CollectorRegistry,
    executor: &E,
    options: &ScrapeOptions,
) -> ScrapeReport
where
    E: QueryExecutor + ?Sized,
{
    let mut report = ScrapeReport::default();

    for collector in registry.list() {
        let start = Instant::now();
        let outcome = if options.disabled.contains(collector.name()) {
            tracing::debug!(collector = %collector.name(), "Collector disabled, skipping");
            CollectorOutcome::Disabled
        } else {
            run_collection(collector, executor, options).await
        };

        report.runs.push(CollectorRun {
            collector: collector.name(),
            outcome,
            duration: start.elapsed(),
        });
    }

    let up = if report.is_up() { 1.0 } else { 0.0 };
    if let Err(e) = registry.up().set(up) {
        tracing::error!(error = %e, "Failed to set up gauge");
    }

    tracing::info!(
        collectors = report.runs.len(),
        failed = report.failed().count(),
        up,
        "Scrape complete"
    );
    report
}

/// Execute a single collector's query and apply its rows.
async fn run_collection<E>(
    collector: &CollectorDefinition,
    executor: &E,
    options: &ScrapeOptions,
) -> CollectorOutcome
where
    E: QueryExecutor + ?Sized,
{
    let name = collector.name();
    tracing::debug!(collector = %name, "Running collection");

    let rows = match timeout(options.query_timeout, executor.execute(collector.query())).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            tracing::error!(collector = %name, error = %e, "Query failed");
            return CollectorOutcome::QueryFailed(e);
        }
        Err(_) => {
            let e = QueryError::Timeout(options.query_timeout);
            tracing::error!(collector = %name, error = %e, "Query timed out");
            return CollectorOutcome::QueryFailed(e);
        }
    };

    match collector.apply(&rows, options.retention) {
        Ok(report) => {
            tracing::debug!(
                collector = %name,
                rows = report.rows,
                written = report.written,
                failures = report.failures.len(),
                "Collection succeeded"
            );
            CollectorOutcome::Applied(report)
        }
        Err(CollectError::EmptyResult) => {
            tracing::warn!(collector = %name, "Query returned no rows, keeping previous values");
            CollectorOutcome::SkippedEmpty
        }
        Err(e) => {
            tracing::error!(collector = %name, error = %e, "Collection failed");
            CollectorOutcome::CollectFailed(e)
        }
    }
}
