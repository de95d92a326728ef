//! Collector definitions: a query, its column contract, the measurements it
//! feeds and the row mapping between them.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use super::row::{CoercionError, Row};
use crate::exposition::{
    ContractError, Exposition, Measurement, MeasurementDescriptor, RegistryError,
};

/// Errors that abort one collector's update for the current cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectError {
    /// A row's width does not match the declared column list.
    #[error("schema mismatch in row {row}: expected {expected} columns, got {actual}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A row mapping read past the end of its row.
    #[error("column {index} out of range for row of width {width}")]
    ColumnOutOfRange { index: usize, width: usize },

    /// A singleton collector received no rows.
    #[error("query returned no rows")]
    EmptyResult,

    /// A measurement handle was misused.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// How many rows a collector consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RowShape {
    /// Only the first row is read; zero rows is [`CollectError::EmptyResult`].
    Singleton,
    /// Every row is mapped independently.
    PerRow,
}

/// What happens to label tuples missing from a new result set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SeriesRetention {
    /// Tuples keep their last value until overwritten.
    #[default]
    Keep,
    /// Label tuples absent from a successfully mapped result set are dropped.
    Clear,
}

/// Maps one row onto measurement updates.
pub type RowMapper = fn(&Row, &mut Update<'_>) -> Result<(), CollectError>;

/// Static declaration of a collector.
#[derive(Debug, Clone, Copy)]
pub struct CollectorSpec {
    /// Collector name, used for logging and configuration.
    pub name: &'static str,
    /// Single read-only statement.
    pub query: &'static str,
    /// Expected SELECT-list columns, in order.
    pub columns: &'static [&'static str],
    pub shape: RowShape,
    /// Short key → descriptor, in documentation order.
    pub measurements: &'static [(&'static str, MeasurementDescriptor)],
    pub mapper: RowMapper,
}

/// Measurement handles bound to one collector, addressed by short key.
#[derive(Debug, Clone)]
pub struct Measurements {
    entries: Vec<(&'static str, Measurement)>,
}

impl Measurements {
    /// Look up a handle by key.
    pub fn get(&self, key: &str) -> Result<&Measurement, ContractError> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| m)
            .ok_or_else(|| ContractError::UnknownKey(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Measurement)> {
        self.entries.iter().map(|(k, m)| (*k, m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop labeled tuples not touched during an apply. Returns how many were dropped.
    fn drop_untouched(&self, touched: &HashMap<&'static str, HashSet<Vec<String>>>) -> usize {
        let mut dropped = 0;
        for (_, m) in self.entries.iter().filter(|(_, m)| m.descriptor().is_labeled()) {
            let seen = touched.get(m.name());
            for tuple in m.label_tuples() {
                if seen.is_some_and(|seen| seen.contains(&tuple)) {
                    continue;
                }
                let values: Vec<&str> = tuple.iter().map(String::as_str).collect();
                if matches!(m.remove_with(&values), Ok(true)) {
                    dropped += 1;
                }
            }
        }
        dropped
    }
}

/// A value that could not be written this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFailure {
    pub measurement: &'static str,
    pub labels: Vec<String>,
    pub error: CoercionError,
}

/// Outcome of one successful apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    /// Rows handed to the mapper.
    pub rows: usize,
    /// Values written.
    pub written: usize,
    /// Values skipped after failed coercion (previous value retained).
    pub failures: Vec<ValueFailure>,
}

/// Write access to a collector's measurements during one apply.
pub struct Update<'a> {
    collector: &'static str,
    measurements: &'a Measurements,
    report: CollectReport,
    // Label tuples written or attempted, per measurement name.
    touched: HashMap<&'static str, HashSet<Vec<String>>>,
}

impl<'a> Update<'a> {
    fn new(collector: &'static str, measurements: &'a Measurements) -> Self {
        Self {
            collector,
            measurements,
            report: CollectReport::default(),
            touched: HashMap::new(),
        }
    }

    /// Set a scalar measurement.
    pub fn set(&mut self, key: &str, value: Result<f64, CoercionError>) -> Result<(), CollectError> {
        self.write(key, &[], value)
    }

    /// Set one label tuple of a labeled measurement.
    pub fn set_with(
        &mut self,
        key: &str,
        labels: &[&str],
        value: Result<f64, CoercionError>,
    ) -> Result<(), CollectError> {
        self.write(key, labels, value)
    }

    fn write(
        &mut self,
        key: &str,
        labels: &[&str],
        value: Result<f64, CoercionError>,
    ) -> Result<(), CollectError> {
        let measurements = self.measurements;
        let measurement = measurements.get(key)?;
        measurement.check_labels(labels)?;
        if !labels.is_empty() {
            self.touched
                .entry(measurement.name())
                .or_default()
                .insert(labels.iter().map(|l| l.to_string()).collect());
        }

        match value {
            Ok(value) => {
                if labels.is_empty() {
                    measurement.set(value)?;
                } else {
                    measurement.set_with(labels, value)?;
                }
                tracing::debug!(
                    collector = %self.collector,
                    measurement = %measurement.name(),
                    labels = ?labels,
                    value,
                    "Fetched value"
                );
                self.report.written += 1;
            }
            Err(error) => {
                tracing::warn!(
                    collector = %self.collector,
                    measurement = %measurement.name(),
                    labels = ?labels,
                    error = %error,
                    "Value coercion failed, keeping previous value"
                );
                self.report.failures.push(ValueFailure {
                    measurement: measurement.name(),
                    labels: labels.iter().map(|l| l.to_string()).collect(),
                    error,
                });
            }
        }
        Ok(())
    }
}

/// A collector bound to its registered measurements.
pub struct CollectorDefinition {
    spec: CollectorSpec,
    measurements: Measurements,
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for CollectorDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorDefinition")
            .field("name", &self.spec.name)
            .field("shape", &self.spec.shape)
            .field("columns", &self.spec.columns)
            .field("measurements", &self.measurements)
            .finish_non_exhaustive()
    }
}

impl CollectorDefinition {
    /// Register every descriptor of `spec` with the sink and bind the handles.
    pub fn register(spec: CollectorSpec, sink: &mut Exposition) -> Result<Self, RegistryError> {
        let entries = spec
            .measurements
            .iter()
            .map(|(key, descriptor)| Ok((*key, sink.register_gauge(*descriptor)?)))
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Ok(Self {
            spec,
            measurements: Measurements { entries },
            in_flight: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn query(&self) -> &'static str {
        self.spec.query
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.spec.columns
    }

    pub fn shape(&self) -> RowShape {
        self.spec.shape
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Descriptors fed by this collector, in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &MeasurementDescriptor> {
        self.measurements.entries.iter().map(|(_, m)| m.descriptor())
    }

    /// Map a result set onto this collector's measurements.
    ///
    /// Every row is checked against the declared column list before anything
    /// is written, so a schema mismatch leaves all values untouched. Under
    /// [`SeriesRetention::Clear`] stale tuples are dropped only after every
    /// row mapped; a tuple whose value failed coercion keeps its last value.
    /// Overlapping calls for the same collector are serialised.
    ///
    /// # Errors
    /// - [`CollectError::SchemaMismatch`]: a row has the wrong width
    /// - [`CollectError::EmptyResult`]: a singleton collector got no rows
    /// - [`CollectError::Contract`] / [`CollectError::ColumnOutOfRange`]: the
    ///   mapper disagrees with its own declaration
    pub fn apply(
        &self,
        rows: &[Row],
        retention: SeriesRetention,
    ) -> Result<CollectReport, CollectError> {
        let _guard = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        let expected = self.spec.columns.len();
        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(CollectError::SchemaMismatch {
                row,
                expected,
                actual: bad.len(),
            });
        }

        let rows = match self.spec.shape {
            RowShape::Singleton => match rows.first() {
                Some(first) => {
                    if rows.len() > 1 {
                        tracing::debug!(
                            collector = %self.spec.name,
                            rows = rows.len(),
                            "Singleton collector ignoring extra rows"
                        );
                    }
                    std::slice::from_ref(first)
                }
                None => return Err(CollectError::EmptyResult),
            },
            RowShape::PerRow => rows,
        };

        let mut update = Update::new(self.spec.name, &self.measurements);
        for row in rows {
            (self.spec.mapper)(row, &mut update)?;
        }

        if retention == SeriesRetention::Clear {
            let dropped = self.measurements.drop_untouched(&update.touched);
            if dropped > 0 {
                tracing::debug!(
                    collector = %self.spec.name,
                    dropped,
                    "Dropped label tuples missing from result set"
                );
            }
        }

        let mut report = update.report;
        report.rows = rows.len();
        Ok(report)
    }
}
