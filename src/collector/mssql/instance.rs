//! Instance-wide collectors: clock, connections, performance counters, CPU.

use crate::collector::{CollectError, CollectorSpec, Row, RowShape, Update};
use crate::exposition::MeasurementDescriptor;

pub const LOCAL_TIME: CollectorSpec = CollectorSpec {
    name: "mssql_instance_local_time",
    query: "SELECT DATEDIFF(second, '19700101', GETUTCDATE())",
    columns: &["seconds_since_epoch"],
    shape: RowShape::Singleton,
    measurements: &[(
        "local_time",
        MeasurementDescriptor::scalar(
            "mssql_instance_local_time",
            "Number of seconds since epoch on local instance",
        ),
    )],
    mapper: map_local_time,
};

fn map_local_time(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("local_time", row.cell(0)?.gauge())
}

pub const CONNECTIONS: CollectorSpec = CollectorSpec {
    name: "mssql_connections",
    query: "SELECT DB_NAME(sP.dbid)
        , COUNT(sP.spid)
FROM sys.sysprocesses sP
GROUP BY DB_NAME(sP.dbid)",
    columns: &["database", "connections"],
    shape: RowShape::PerRow,
    measurements: &[(
        "connections",
        MeasurementDescriptor::labeled(
            "mssql_connections",
            "Number of active connections",
            &["database", "state"],
        ),
    )],
    mapper: map_connections,
};

fn map_connections(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let database = row.cell(0)?.label();
    update.set_with("connections", &[&database, "current"], row.cell(1)?.gauge())
}

pub const DEADLOCKS: CollectorSpec = CollectorSpec {
    name: "mssql_deadlocks",
    query: "SELECT cntr_value
FROM sys.dm_os_performance_counters
where counter_name = 'Number of Deadlocks/sec' AND instance_name = '_Total'",
    columns: &["cntr_value"],
    shape: RowShape::Singleton,
    measurements: &[(
        "deadlocks_per_second",
        MeasurementDescriptor::scalar(
            "mssql_deadlocks",
            "Number of lock requests per second that resulted in a deadlock since last restart",
        ),
    )],
    mapper: map_deadlocks,
};

fn map_deadlocks(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("deadlocks_per_second", row.cell(0)?.counter())
}

pub const USER_ERRORS: CollectorSpec = CollectorSpec {
    name: "mssql_user_errors",
    query: "SELECT cntr_value
FROM sys.dm_os_performance_counters
where counter_name = 'Errors/sec' AND instance_name = 'User Errors'",
    columns: &["cntr_value"],
    shape: RowShape::Singleton,
    measurements: &[(
        "user_errors",
        MeasurementDescriptor::scalar(
            "mssql_user_errors",
            "Number of user errors/sec since last restart",
        ),
    )],
    mapper: map_user_errors,
};

fn map_user_errors(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("user_errors", row.cell(0)?.counter())
}

pub const KILL_CONNECTION_ERRORS: CollectorSpec = CollectorSpec {
    name: "mssql_kill_connection_errors",
    query: "SELECT cntr_value
FROM sys.dm_os_performance_counters
where counter_name = 'Errors/sec' AND instance_name = 'Kill Connection Errors'",
    columns: &["cntr_value"],
    shape: RowShape::Singleton,
    measurements: &[(
        "kill_connection_errors",
        MeasurementDescriptor::scalar(
            "mssql_kill_connection_errors",
            "Number of kill connection errors/sec since last restart",
        ),
    )],
    mapper: map_kill_connection_errors,
};

fn map_kill_connection_errors(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("kill_connection_errors", row.cell(0)?.counter())
}

pub const PAGE_LIFE_EXPECTANCY: CollectorSpec = CollectorSpec {
    name: "mssql_page_life_expectancy",
    query: "SELECT TOP 1  cntr_value
FROM sys.dm_os_performance_counters with (nolock)where counter_name='Page life expectancy'",
    columns: &["cntr_value"],
    shape: RowShape::Singleton,
    measurements: &[(
        "page_life_expectancy",
        MeasurementDescriptor::scalar(
            "mssql_page_life_expectancy",
            "Indicates the minimum number of seconds a page will stay in the buffer pool on this node without references. The traditional advice from Microsoft used to be that the PLE should remain above 300 seconds",
        ),
    )],
    mapper: map_page_life_expectancy,
};

fn map_page_life_expectancy(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("page_life_expectancy", row.cell(0)?.counter())
}

pub const BATCH_REQUESTS: CollectorSpec = CollectorSpec {
    name: "mssql_batch_requests",
    query: "SELECT TOP 1 cntr_value
FROM sys.dm_os_performance_counters where counter_name = 'Batch Requests/sec'",
    columns: &["cntr_value"],
    shape: RowShape::Singleton,
    measurements: &[(
        "batch_requests",
        MeasurementDescriptor::scalar(
            "mssql_batch_requests",
            "Number of Transact-SQL command batches received per second. This statistic is affected by all constraints (such as I/O, number of users, cachesize, complexity of requests, and so on). High batch requests mean good throughput",
        ),
    )],
    mapper: map_batch_requests,
};

fn map_batch_requests(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("batch_requests", row.cell(0)?.counter())
}

pub const CPU_USAGE: CollectorSpec = CollectorSpec {
    name: "mssql_cpu_usage",
    query: "SELECT
    cpu_idle = record.value('(./Record/SchedulerMonitorEvent/SystemHealth/SystemIdle)[1]', 'int'),
    cpu_sql = record.value('(./Record/SchedulerMonitorEvent/SystemHealth/ProcessUtilization)[1]', 'int')
FROM (
    SELECT TOP 1 CONVERT(XML, record) AS record
    FROM sys.dm_os_ring_buffers
    WHERE ring_buffer_type = N'RING_BUFFER_SCHEDULER_MONITOR'
    AND record LIKE '% %'
    ORDER BY TIMESTAMP DESC
) as cpu_usage",
    columns: &["cpu_idle", "cpu_sql"],
    shape: RowShape::Singleton,
    measurements: &[
        (
            "cpu_idle",
            MeasurementDescriptor::scalar("mssql_cpu_idle_percentage", "Percentage of CPU idle"),
        ),
        (
            "cpu_usage",
            MeasurementDescriptor::scalar("mssql_cpu_usage_percentage", "Percentage of CPU usage"),
        ),
    ],
    mapper: map_cpu_usage,
};

fn map_cpu_usage(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("cpu_idle", row.cell(0)?.counter())?;
    update.set("cpu_usage", row.cell(1)?.counter())
}
