//! Measurement descriptors and gauge handles.

use prometheus::core::Collector as _;
use prometheus::{Gauge, GaugeVec, Opts};

use super::error::ContractError;

/// Static metadata for one exported gauge series.
///
/// An empty `label_names` slice describes a scalar series; otherwise the
/// descriptor describes a family keyed by label-value tuples in the given
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementDescriptor {
    /// Exported series name (external contract key).
    pub name: &'static str,
    /// Human-readable description.
    pub help: &'static str,
    /// Ordered label dimension names.
    pub label_names: &'static [&'static str],
}

impl MeasurementDescriptor {
    /// Describe a scalar series.
    pub const fn scalar(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            label_names: &[],
        }
    }

    /// Describe a labeled series family.
    pub const fn labeled(
        name: &'static str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            label_names,
        }
    }

    /// Whether the series is keyed by label tuples.
    pub fn is_labeled(&self) -> bool {
        !self.label_names.is_empty()
    }

    /// Series name annotated with its label dimensions, e.g. `mssql_log_growths{database}`.
    pub fn signature(&self) -> String {
        if self.is_labeled() {
            format!("{}{{{}}}", self.name, self.label_names.join(","))
        } else {
            self.name.to_string()
        }
    }
}

#[derive(Clone)]
enum GaugeKind {
    Scalar(Gauge),
    Labeled(GaugeVec),
}

/// Handle to a registered gauge.
///
/// Handles are cheap to clone; all clones share the same underlying value
/// state. Every `set` overwrites (last write wins, nothing accumulates).
#[derive(Clone)]
pub struct Measurement {
    descriptor: MeasurementDescriptor,
    gauge: GaugeKind,
}

impl std::fmt::Debug for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Measurement")
            .field("descriptor", &self.descriptor)
            .field("series", &self.series_count())
            .finish()
    }
}

impl Measurement {
    /// Build an unregistered gauge for `descriptor`.
    pub(crate) fn new(descriptor: MeasurementDescriptor) -> Result<Self, prometheus::Error> {
        let opts = Opts::new(descriptor.name, descriptor.help);
        let gauge = if descriptor.is_labeled() {
            GaugeKind::Labeled(GaugeVec::new(opts, descriptor.label_names)?)
        } else {
            GaugeKind::Scalar(Gauge::with_opts(opts)?)
        };
        Ok(Self { descriptor, gauge })
    }

    /// Boxed collector for registration with a [`prometheus::Registry`].
    pub(crate) fn boxed_collector(&self) -> Box<dyn prometheus::core::Collector> {
        match &self.gauge {
            GaugeKind::Scalar(g) => Box::new(g.clone()),
            GaugeKind::Labeled(v) => Box::new(v.clone()),
        }
    }

    pub fn descriptor(&self) -> &MeasurementDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Check that `label_values` fits this measurement's shape.
    pub fn check_labels(&self, label_values: &[&str]) -> Result<(), ContractError> {
        let expected = self.descriptor.label_names.len();
        match (expected, label_values.len()) {
            (0, 0) => Ok(()),
            (0, _) => Err(ContractError::NotLabeled(self.name().to_string())),
            (_, 0) => Err(ContractError::NotScalar(self.name().to_string())),
            (expected, actual) if expected != actual => Err(ContractError::LabelArity {
                name: self.name().to_string(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }

    /// Overwrite the value of a scalar series.
    pub fn set(&self, value: f64) -> Result<(), ContractError> {
        match &self.gauge {
            GaugeKind::Scalar(g) => {
                g.set(value);
                Ok(())
            }
            GaugeKind::Labeled(_) => Err(ContractError::NotScalar(self.name().to_string())),
        }
    }

    /// Overwrite (or create) the value for one label tuple.
    pub fn set_with(&self, label_values: &[&str], value: f64) -> Result<(), ContractError> {
        match &self.gauge {
            GaugeKind::Scalar(_) => Err(ContractError::NotLabeled(self.name().to_string())),
            GaugeKind::Labeled(vec) => {
                self.check_labels(label_values)?;
                let gauge = vec.get_metric_with_label_values(label_values).map_err(|_| {
                    ContractError::LabelArity {
                        name: self.name().to_string(),
                        expected: self.descriptor.label_names.len(),
                        actual: label_values.len(),
                    }
                })?;
                gauge.set(value);
                Ok(())
            }
        }
    }

    /// Current value of a scalar series.
    pub fn value(&self) -> Result<f64, ContractError> {
        match &self.gauge {
            GaugeKind::Scalar(g) => Ok(g.get()),
            GaugeKind::Labeled(_) => Err(ContractError::NotScalar(self.name().to_string())),
        }
    }

    /// Current value for one label tuple, `None` if it was never written.
    ///
    /// Reads go through the collected snapshot so an absent tuple is not
    /// created as a side effect.
    pub fn value_with(&self, label_values: &[&str]) -> Result<Option<f64>, ContractError> {
        let GaugeKind::Labeled(vec) = &self.gauge else {
            return Err(ContractError::NotLabeled(self.name().to_string()));
        };
        self.check_labels(label_values)?;

        let expected: Vec<(&str, &str)> = self
            .descriptor
            .label_names
            .iter()
            .copied()
            .zip(label_values.iter().copied())
            .collect();

        let found = vec
            .collect()
            .iter()
            .flat_map(|family| family.get_metric().iter())
            .find(|metric| {
                metric.get_label().iter().all(|pair| {
                    expected
                        .iter()
                        .any(|(name, value)| pair.get_name() == *name && pair.get_value() == *value)
                })
            })
            .map(|metric| metric.get_gauge().get_value());
        Ok(found)
    }

    /// Number of series currently exposed (always 1 for scalars).
    pub fn series_count(&self) -> usize {
        match &self.gauge {
            GaugeKind::Scalar(_) => 1,
            GaugeKind::Labeled(vec) => vec
                .collect()
                .iter()
                .map(|family| family.get_metric().len())
                .sum(),
        }
    }

    /// Label tuples currently exposed, each in descriptor label order.
    pub fn label_tuples(&self) -> Vec<Vec<String>> {
        let GaugeKind::Labeled(vec) = &self.gauge else {
            return Vec::new();
        };
        vec.collect()
            .iter()
            .flat_map(|family| family.get_metric().iter())
            .map(|metric| {
                self.descriptor
                    .label_names
                    .iter()
                    .map(|name| {
                        metric
                            .get_label()
                            .iter()
                            .find(|pair| pair.get_name() == *name)
                            .map(|pair| pair.get_value().to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    /// Drop one label tuple. Returns `false` if the tuple was not exposed.
    pub fn remove_with(&self, label_values: &[&str]) -> Result<bool, ContractError> {
        let GaugeKind::Labeled(vec) = &self.gauge else {
            return Err(ContractError::NotLabeled(self.name().to_string()));
        };
        self.check_labels(label_values)?;
        Ok(vec.remove_label_values(label_values).is_ok())
    }
}
