//! Collector registry: the ordered collector list plus the `up` gauge.

use crate::collector::{CollectorDefinition, CollectorSpec, mssql};
use crate::exposition::{Exposition, Measurement, MeasurementDescriptor, RegistryError};

/// Process-health gauge, set by the scrape cycle.
pub const UP: MeasurementDescriptor = MeasurementDescriptor::scalar("up", "UP Status");

/// Fixed, ordered set of collectors bound to one exposition sink.
///
/// Every descriptor is registered while the registry is built; a duplicate
/// name anywhere in the set fails construction.
pub struct CollectorRegistry {
    up: Measurement,
    collectors: Vec<CollectorDefinition>,
}

impl CollectorRegistry {
    /// Build the registry of SQL Server collectors.
    ///
    /// # Errors
    /// Returns [`RegistryError`] if any descriptor cannot be registered.
    pub fn new(sink: &mut Exposition) -> Result<Self, RegistryError> {
        Self::with_specs(sink, mssql::COLLECTORS)
    }

    /// Build a registry from an arbitrary collector set.
    pub fn with_specs(
        sink: &mut Exposition,
        specs: &[CollectorSpec],
    ) -> Result<Self, RegistryError> {
        let up = sink.register_gauge(UP)?;
        let collectors = specs
            .iter()
            .map(|spec| CollectorDefinition::register(*spec, sink))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            collectors = collectors.len(),
            measurements = sink.len(),
            "Collector registry initialized"
        );
        Ok(Self { up, collectors })
    }

    /// Collectors in registry order.
    pub fn list(&self) -> &[CollectorDefinition] {
        &self.collectors
    }

    /// Look up a collector by name.
    pub fn get(&self, name: &str) -> Option<&CollectorDefinition> {
        self.collectors.iter().find(|c| c.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collectors.iter().map(|c| c.name())
    }

    /// The `up` health gauge.
    pub fn up(&self) -> &Measurement {
        &self.up
    }

    /// Number of measurements fed by collectors (excluding `up`).
    pub fn measurement_count(&self) -> usize {
        self.collectors.iter().map(|c| c.measurements().len()).sum()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("collector_count", &self.collectors.len())
            .field("measurement_count", &self.measurement_count())
            .finish_non_exhaustive()
    }
}
