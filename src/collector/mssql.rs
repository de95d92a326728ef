//! SQL Server collectors.
//!
//! - [`instance`]: clock, connections, performance counters, CPU
//! - [`database`]: per-database state, log growth, file sizes, I/O stalls
//! - [`os`]: process and system memory

pub mod database;
pub mod instance;
pub mod os;

use super::CollectorSpec;

/// Every SQL Server collector, in scrape and documentation order.
pub static COLLECTORS: &[CollectorSpec] = &[
    instance::LOCAL_TIME,
    instance::CONNECTIONS,
    instance::DEADLOCKS,
    instance::USER_ERRORS,
    instance::KILL_CONNECTION_ERRORS,
    database::DATABASE_STATE,
    database::LOG_GROWTHS,
    database::DATABASE_FILESIZE,
    instance::PAGE_LIFE_EXPECTANCY,
    database::IO_STALL,
    instance::BATCH_REQUESTS,
    os::PROCESS_MEMORY,
    os::SYSTEM_MEMORY,
    instance::CPU_USAGE,
];
