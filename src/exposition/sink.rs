//! The exposition sink: one Prometheus registry plus a name ledger.

use std::collections::BTreeSet;

use prometheus::{Encoder, Registry, TextEncoder};

use super::error::RegistryError;
use super::measurement::{Measurement, MeasurementDescriptor};

/// Owns the Prometheus registry all measurements are exposed through.
///
/// Registration takes `&mut self`: descriptors are registered once while the
/// collector registry is built, after which only value updates happen through
/// [`Measurement`] handles.
pub struct Exposition {
    registry: Registry,
    names: BTreeSet<&'static str>,
}

impl Exposition {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            names: BTreeSet::new(),
        }
    }

    /// Register a gauge and return its handle.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] if the name is already taken; the
    /// existing registration and its values are left untouched.
    pub fn register_gauge(
        &mut self,
        descriptor: MeasurementDescriptor,
    ) -> Result<Measurement, RegistryError> {
        if self.names.contains(descriptor.name) {
            tracing::error!(measurement = %descriptor.name, "Duplicate measurement registration");
            return Err(RegistryError::Duplicate(descriptor.name.to_string()));
        }

        let measurement =
            Measurement::new(descriptor).map_err(|source| RegistryError::Invalid {
                name: descriptor.name.to_string(),
                source,
            })?;

        self.registry
            .register(measurement.boxed_collector())
            .map_err(|source| match source {
                prometheus::Error::AlreadyReg => {
                    RegistryError::Duplicate(descriptor.name.to_string())
                }
                source => RegistryError::Invalid {
                    name: descriptor.name.to_string(),
                    source,
                },
            })?;

        self.names.insert(descriptor.name);
        tracing::debug!(
            measurement = %descriptor.name,
            labels = ?descriptor.label_names,
            "Gauge registered"
        );
        Ok(measurement)
    }

    /// Whether a measurement with this name has been registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registered measurement names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Underlying registry, for mounting behind an HTTP endpoint.
    pub fn prometheus_registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered family in the Prometheus text format.
    pub fn render(&self) -> Result<String, RegistryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for Exposition {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Exposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposition")
            .field("measurements", &self.names.len())
            .finish_non_exhaustive()
    }
}
