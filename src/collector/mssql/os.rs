//! Operating-system memory collectors.

use crate::collector::{CollectError, CollectorSpec, Row, RowShape, Update};
use crate::exposition::MeasurementDescriptor;

pub const PROCESS_MEMORY: CollectorSpec = CollectorSpec {
    name: "mssql_os_process_memory",
    query: "SELECT page_fault_count, memory_utilization_percentage
from sys.dm_os_process_memory",
    columns: &["page_fault_count", "memory_utilization_percentage"],
    shape: RowShape::Singleton,
    measurements: &[
        (
            "page_fault_count",
            MeasurementDescriptor::scalar(
                "mssql_page_fault_count",
                "Number of page faults since last restart",
            ),
        ),
        (
            "memory_utilization_percentage",
            MeasurementDescriptor::scalar(
                "mssql_memory_utilization_percentage",
                "Percentage of memory utilization",
            ),
        ),
    ],
    mapper: map_process_memory,
};

fn map_process_memory(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    update.set("page_fault_count", row.cell(0)?.counter())?;
    update.set("memory_utilization_percentage", row.cell(1)?.gauge())
}

pub const SYSTEM_MEMORY: CollectorSpec = CollectorSpec {
    name: "mssql_os_sys_memory",
    query: "SELECT total_physical_memory_kb, available_physical_memory_kb, total_page_file_kb, available_page_file_kb
from sys.dm_os_sys_memory",
    columns: &[
        "total_physical_memory_kb",
        "available_physical_memory_kb",
        "total_page_file_kb",
        "available_page_file_kb",
    ],
    shape: RowShape::Singleton,
    measurements: &[
        (
            "total_physical_memory_kb",
            MeasurementDescriptor::scalar(
                "mssql_total_physical_memory_kb",
                "Total physical memory in KB",
            ),
        ),
        (
            "available_physical_memory_kb",
            MeasurementDescriptor::scalar(
                "mssql_available_physical_memory_kb",
                "Available physical memory in KB",
            ),
        ),
        (
            "total_page_file_kb",
            MeasurementDescriptor::scalar("mssql_total_page_file_kb", "Total page file in KB"),
        ),
        (
            "available_page_file_kb",
            MeasurementDescriptor::scalar(
                "mssql_available_page_file_kb",
                "Available page file in KB",
            ),
        ),
    ],
    mapper: map_system_memory,
};

fn map_system_memory(row: &Row, update: &mut Update<'_>) -> Result<(), CollectError> {
    let keys = [
        "total_physical_memory_kb",
        "available_physical_memory_kb",
        "total_page_file_kb",
        "available_page_file_kb",
    ];
    for (index, key) in keys.into_iter().enumerate() {
        update.set(key, row.cell(index)?.counter())?;
    }
    Ok(())
}
