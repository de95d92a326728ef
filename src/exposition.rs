//! Exposition Layer
//!
//! Gauge registration and Prometheus text rendering, backed by a
//! [`prometheus::Registry`] owned by the caller (no process-global registry).
//!
//! # Components
//!
//! - [`MeasurementDescriptor`]: Static metadata for one exported series
//! - [`Measurement`]: Handle used to set (and read back) gauge values
//! - [`Exposition`]: The sink every descriptor is registered with exactly once
//! - [`RegistryError`] / [`ContractError`]: Registration and usage failures

mod error;
mod measurement;
mod sink;

pub use error::{ContractError, RegistryError};
pub use measurement::{Measurement, MeasurementDescriptor};
pub use sink::Exposition;
