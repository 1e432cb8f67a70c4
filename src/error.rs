//! Structured error types for gridbody.
//!
//! Only configuration mistakes are fatal. Transient inconsistency during a
//! re-render (stale cache vs. row count) is absorbed by clamped index math
//! and never surfaces as an error.

/// All errors that can occur while driving the grid body.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Invalid configuration supplied by the caller, e.g. an enumerated
    /// column with an empty option list or a non-finite fixed row height.
    #[error("Configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error from structured option values.
    #[error("Value encoding: {0}")]
    Value(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;
