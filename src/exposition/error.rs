//! Exposition-specific error types.
//!
//! [`RegistryError`] is raised while registering descriptors and is fatal to
//! startup. [`ContractError`] signals a programming-level misuse of a
//! measurement handle and aborts the current collector cycle only.

use thiserror::Error;

/// Errors raised while registering or rendering measurements.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A descriptor with the same name was already registered.
    #[error("duplicate measurement registration: '{0}'")]
    Duplicate(String),

    /// The descriptor was rejected by the Prometheus client (bad name or labels).
    #[error("invalid measurement '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    /// Failed to encode the registry into the text exposition format.
    #[error("failed to encode exposition: {0}")]
    Encode(#[from] prometheus::Error),

    /// Encoded exposition was not valid UTF-8.
    #[error("exposition is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Misuse of a measurement handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Scalar `set` called on a labeled measurement.
    #[error("measurement '{0}' is labeled and must be set with label values")]
    NotScalar(String),

    /// Labeled `set` called on a scalar measurement.
    #[error("measurement '{0}' is scalar and takes no label values")]
    NotLabeled(String),

    /// Wrong number of label values for a labeled measurement.
    #[error("measurement '{name}' expects {expected} label values, got {actual}")]
    LabelArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A collector referenced a measurement key it does not own.
    #[error("unknown measurement key '{0}'")]
    UnknownKey(String),
}
