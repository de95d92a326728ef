//! Scrape Integration Tests
//!
//! Drives the full collector set through a fixture executor and checks the
//! rendered exposition.

use std::collections::HashMap;
use std::sync::Mutex;

use mssql_exporter::collector::mssql::{database, instance, os};
use mssql_exporter::{
    AppConfig, CollectError, CollectorOutcome, CollectorRegistry, Exposition, QueryError,
    QueryExecutor, Row, ScrapeOptions, SeriesRetention, Value, scrape,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Executor answering each query from a fixture table.
#[derive(Default)]
struct FixtureExecutor {
    responses: Mutex<HashMap<&'static str, Result<Vec<Row>, QueryError>>>,
    calls: Mutex<Vec<String>>,
}

impl FixtureExecutor {
    fn respond(&self, query: &'static str, rows: Vec<Row>) {
        self.responses.lock().unwrap().insert(query, Ok(rows));
    }

    fn fail(&self, query: &'static str, error: QueryError) {
        self.responses.lock().unwrap().insert(query, Err(error));
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl QueryExecutor for FixtureExecutor {
    async fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError> {
        self.calls.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn row(cells: Vec<Value>) -> Row {
    Row::new(cells)
}

fn setup() -> (Exposition, CollectorRegistry) {
    let mut sink = Exposition::new();
    let registry = CollectorRegistry::new(&mut sink).expect("registry builds");
    (sink, registry)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_connections_scenario() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();
    executor.respond(
        instance::CONNECTIONS.query,
        vec![
            row(vec![Value::from("AppDB"), Value::Int(12)]),
            row(vec![Value::from("Reporting"), Value::Int(3)]),
        ],
    );

    let report = scrape(&registry, &executor, &ScrapeOptions::default()).await;
    assert!(matches!(
        report.outcome("mssql_connections"),
        Some(CollectorOutcome::Applied(_))
    ));

    let text = sink.render().unwrap();
    assert!(text.contains(r#"mssql_connections{database="AppDB",state="current"} 12"#));
    assert!(text.contains(r#"mssql_connections{database="Reporting",state="current"} 3"#));
    assert_eq!(text.matches("mssql_connections{").count(), 2);
}

#[tokio::test]
async fn test_counter_string_is_exposed_as_integer() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();
    executor.respond(instance::BATCH_REQUESTS.query, vec![row(vec![Value::from("1024")])]);

    scrape(&registry, &executor, &ScrapeOptions::default()).await;

    let text = sink.render().unwrap();
    assert!(text.contains("\nmssql_batch_requests 1024\n"));
    let batch = registry.get("mssql_batch_requests").unwrap();
    assert_eq!(
        batch.measurements().get("batch_requests").unwrap().value().unwrap(),
        1024.0
    );
}

#[tokio::test]
async fn test_every_collector_runs_in_order() {
    let (_sink, registry) = setup();
    let executor = FixtureExecutor::default();

    let report = scrape(&registry, &executor, &ScrapeOptions::default()).await;

    assert_eq!(executor.call_count(), 14);
    let order: Vec<_> = report.runs.iter().map(|r| r.collector).collect();
    let expected: Vec<_> = registry.names().collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_empty_singleton_is_skipped_and_keeps_value() {
    let (_sink, registry) = setup();
    let executor = FixtureExecutor::default();
    executor.respond(instance::DEADLOCKS.query, vec![row(vec![Value::from("4")])]);
    scrape(&registry, &executor, &ScrapeOptions::default()).await;

    executor.respond(instance::DEADLOCKS.query, Vec::new());
    let report = scrape(&registry, &executor, &ScrapeOptions::default()).await;

    assert_eq!(
        report.outcome("mssql_deadlocks"),
        Some(&CollectorOutcome::SkippedEmpty)
    );
    assert!(report.is_up());
    let deadlocks = registry.get("mssql_deadlocks").unwrap();
    assert_eq!(
        deadlocks
            .measurements()
            .get("deadlocks_per_second")
            .unwrap()
            .value()
            .unwrap(),
        4.0
    );
}

#[tokio::test]
async fn test_failures_stay_local_to_one_collector() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();
    executor.respond(
        database::DATABASE_STATE.query,
        vec![row(vec![Value::from("master"), Value::Int(0)])],
    );
    executor.respond(
        os::SYSTEM_MEMORY.query,
        vec![row(vec![Value::Int(1), Value::Int(2)])],
    );
    executor.fail(
        instance::CPU_USAGE.query,
        QueryError::Failed("VIEW SERVER STATE permission denied".into()),
    );
    executor.respond(
        instance::LOCAL_TIME.query,
        vec![row(vec![Value::Int(1_700_000_000)])],
    );

    let report = scrape(&registry, &executor, &ScrapeOptions::default()).await;

    assert!(matches!(
        report.outcome("mssql_os_sys_memory"),
        Some(CollectorOutcome::CollectFailed(CollectError::SchemaMismatch {
            expected: 4,
            actual: 2,
            ..
        }))
    ));
    assert!(matches!(
        report.outcome("mssql_cpu_usage"),
        Some(CollectorOutcome::QueryFailed(_))
    ));
    assert_eq!(report.failed().count(), 2);
    assert!(!report.is_up());
    assert_eq!(registry.up().value().unwrap(), 0.0);

    let text = sink.render().unwrap();
    assert!(text.contains(r#"mssql_database_state{database="master"} 0"#));
    assert!(text.contains("mssql_instance_local_time 1700000000"));
    assert!(text.contains("\nup 0\n"));
}

#[tokio::test]
async fn test_clear_retention_drops_vanished_databases() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();
    executor.respond(
        database::LOG_GROWTHS.query,
        vec![
            row(vec![Value::from("AppDB"), Value::from("3")]),
            row(vec![Value::from("Dropped"), Value::from("1")]),
        ],
    );
    scrape(&registry, &executor, &ScrapeOptions::default()).await;

    executor.respond(
        database::LOG_GROWTHS.query,
        vec![row(vec![Value::from("AppDB"), Value::from("5")])],
    );
    let keep = scrape(&registry, &executor, &ScrapeOptions::default()).await;
    assert!(keep.is_up());
    assert!(sink
        .render()
        .unwrap()
        .contains(r#"mssql_log_growths{database="Dropped"} 1"#));

    let options = ScrapeOptions {
        retention: SeriesRetention::Clear,
        ..Default::default()
    };
    scrape(&registry, &executor, &options).await;

    let text = sink.render().unwrap();
    assert!(text.contains(r#"mssql_log_growths{database="AppDB"} 5"#));
    assert!(!text.contains("Dropped"));
}

#[tokio::test]
async fn test_healthy_scrape_sets_up() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();

    let report = scrape(&registry, &executor, &ScrapeOptions::default()).await;

    assert!(report.is_up());
    assert_eq!(report.failed().count(), 0);
    assert!(sink.render().unwrap().contains("\nup 1\n"));
}

#[tokio::test]
async fn test_config_file_drives_scrape_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        b"query_timeout: 2s\nseries_retention: clear\ndisabled_collectors:\n  - mssql_cpu_usage\n",
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    let (_sink, registry) = setup();
    config.validate_collectors(registry.names()).unwrap();

    let executor = FixtureExecutor::default();
    executor.fail(instance::CPU_USAGE.query, QueryError::Connection("refused".into()));

    let report = scrape(&registry, &executor, &config.scrape_options()).await;

    assert_eq!(
        report.outcome("mssql_cpu_usage"),
        Some(&CollectorOutcome::Disabled)
    );
    assert_eq!(executor.call_count(), 13);
    assert!(report.is_up());
}

#[tokio::test]
async fn test_clear_retention_keeps_series_with_null_value() {
    let (sink, registry) = setup();
    let executor = FixtureExecutor::default();
    let options = ScrapeOptions {
        retention: SeriesRetention::Clear,
        ..Default::default()
    };
    executor.respond(
        database::LOG_GROWTHS.query,
        vec![row(vec![Value::from("AppDB"), Value::from("7")])],
    );
    scrape(&registry, &executor, &options).await;

    executor.respond(
        database::LOG_GROWTHS.query,
        vec![row(vec![Value::from("AppDB"), Value::Null])],
    );
    let report = scrape(&registry, &executor, &options).await;

    let Some(CollectorOutcome::Applied(applied)) = report.outcome("mssql_log_growths") else {
        panic!("log growths not applied");
    };
    assert_eq!(applied.failures.len(), 1);
    assert!(sink
        .render()
        .unwrap()
        .contains(r#"mssql_log_growths{database="AppDB"} 7"#));
}
