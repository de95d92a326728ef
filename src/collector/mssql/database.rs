//! Per-database collectors: state, log growth, file sizes, I/O stalls.

use crate::collector::{CollectError, CollectorSpec, Row, RowShape, Update};
use crate::exposition::MeasurementDescriptor;

pub const DATABASE_STATE: CollectorSpec = CollectorSpec {
    name: "mssql_database_state",
    query: "SELECT name,state FROM master.sys.databases",
    columns: &["name", "state"],
    shape: RowShape::PerRow,
    measurements: &[(
        "database_state",
        MeasurementDescriptor::labeled(
            "mssql_database_state",
            "Databases states: 0=ONLINE 1=RESTORING 2=RECOVERING 3=RECOVERY_PENDING 4=SUSPECT 5=EMERGENCY 6=OFFLINE 7=COPYING 10=OFFLINE_SECONDARY",
            &["database"],
        ),
    )],
    mapper: map_database_state,
};

fn map_database_state(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let database = row.cell(0)?.label();
    update.set_with("database_state", &[&database], row.cell(1)?.gauge())
}

pub const LOG_GROWTHS: CollectorSpec = CollectorSpec {
    name: "mssql_log_growths",
    query: "SELECT rtrim(instance_name),cntr_value
FROM sys.dm_os_performance_counters where counter_name = 'Log Growths'
and  instance_name <> '_Total'",
    columns: &["database", "cntr_value"],
    shape: RowShape::PerRow,
    measurements: &[(
        "log_growths",
        MeasurementDescriptor::labeled(
            "mssql_log_growths",
            "Total number of times the transaction log for the database has been expanded last restart",
            &["database"],
        ),
    )],
    mapper: map_log_growths,
};

fn map_log_growths(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let database = row.cell(0)?.label();
    update.set_with("log_growths", &[&database], row.cell(1)?.counter())
}

pub const DATABASE_FILESIZE: CollectorSpec = CollectorSpec {
    name: "mssql_database_filesize",
    query: "SELECT DB_NAME(database_id) AS database_name, Name AS logical_name, type, physical_name, (size * 8) size_kb FROM sys.master_files",
    columns: &[
        "database_name",
        "logical_name",
        "type",
        "physical_name",
        "size_kb",
    ],
    shape: RowShape::PerRow,
    measurements: &[(
        "database_filesize",
        MeasurementDescriptor::labeled(
            "mssql_database_filesize",
            "Physical sizes of files used by database in KB, their names and types (0=rows, 1=log, 2=filestream,3=n/a 4=fulltext(before v2008 of MSSQL))",
            &["database", "logicalname", "type", "filename"],
        ),
    )],
    mapper: map_database_filesize,
};

fn map_database_filesize(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let database = row.cell(0)?.label();
    let logical_name = row.cell(1)?.label();
    let file_type = row.cell(2)?.label();
    let file_name = row.cell(3)?.label();
    update.set_with(
        "database_filesize",
        &[&database, &logical_name, &file_type, &file_name],
        row.cell(4)?.gauge(),
    )
}

pub const IO_STALL: CollectorSpec = CollectorSpec {
    name: "mssql_io_stall",
    query: "SELECT
cast(DB_Name(a.database_id) as varchar) as name,
    max(io_stall_read_ms),
    max(io_stall_write_ms),
    max(io_stall),
    max(io_stall_queued_read_ms),
    max(io_stall_queued_write_ms)
FROM
sys.dm_io_virtual_file_stats(null, null) a
INNER JOIN sys.master_files b ON a.database_id = b.database_id and a.file_id = b.file_id
group by a.database_id",
    columns: &[
        "name",
        "io_stall_read_ms",
        "io_stall_write_ms",
        "io_stall",
        "io_stall_queued_read_ms",
        "io_stall_queued_write_ms",
    ],
    shape: RowShape::PerRow,
    measurements: &[
        (
            "io_stall",
            MeasurementDescriptor::labeled(
                "mssql_io_stall",
                "Wait time (ms) of stall since last restart",
                &["database", "type"],
            ),
        ),
        (
            "io_stall_total",
            MeasurementDescriptor::labeled(
                "mssql_io_stall_total",
                "Wait time (ms) of stall since last restart",
                &["database"],
            ),
        ),
    ],
    mapper: map_io_stall,
};

fn map_io_stall(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let database = row.cell(0)?.label();
    tracing::debug!(collector = "mssql_io_stall", database = %database, "Fetch stalls for database");

    update.set_with("io_stall_total", &[&database], row.cell(3)?.counter())?;
    for (index, stall_type) in [(1, "read"), (2, "write"), (4, "queued_read"), (5, "queued_write")] {
        update.set_with("io_stall", &[&database, stall_type], row.cell(index)?.counter())?;
    }
    Ok(())
}
