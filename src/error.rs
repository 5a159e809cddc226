//! Custom error types for object-tracker
//!
//! This module defines the error hierarchy for the library using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// Error returned by an observer callback
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for object-tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// A comparison against the initial state was requested without one
    #[error("Initial state missing: call set_initial_state before comparing")]
    InitialStateMissing,

    /// The subject has no attribute with this name
    #[error("Attribute not found: {0}")]
    UnknownAttribute(String),

    /// The attribute name is reserved for the tracker itself
    #[error("Attribute '{0}' is reserved for the tracker")]
    ReservedAttribute(String),

    /// The subject does not serialize to a map of named attributes
    #[error("{0} does not serialize to an object with named attributes")]
    NotAnObject(&'static str),

    /// The value does not survive a serialize/deserialize round trip
    #[error("{0} does not round-trip through serde; assign it with update instead")]
    LossyRoundTrip(&'static str),

    /// An observer callback failed
    #[error("Observer failed for attribute '{attribute}': {source}")]
    Observer {
        attribute: String,
        #[source]
        source: ObserverError,
    },
}

impl TrackerError {
    /// Create an observer error for an attribute
    pub fn observer(attribute: impl Into<String>, source: ObserverError) -> Self {
        Self::Observer {
            attribute: attribute.into(),
            source,
        }
    }

    /// Check if this error came from an observer callback
    pub fn is_observer(&self) -> bool {
        matches!(self, Self::Observer { .. })
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for object-tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
