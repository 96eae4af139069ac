//! Error types for the Smelter library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Smelter operations.
#[derive(Debug, Error)]
pub enum SmelterError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid configuration. Reported synchronously, before any detector runs.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single column's derived value could not be computed. The column is
    /// skipped by the requesting detector; the run continues.
    #[error("Column '{column}': {message}")]
    ColumnComputation { column: String, message: String },

    /// An entire detector failed. The run continues with the remaining
    /// detectors; the failing detector contributes no findings.
    #[error("Detector '{detector}' failed: {message}")]
    Detector { detector: String, message: String },

    /// A transformer resolved to no execution phase. This indicates a
    /// registry misconfiguration, not a data problem, and is fatal.
    #[error("Scheduling invariant violated: {0}")]
    Scheduling(String),

    /// A referenced column does not exist in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Smelter operations.
pub type Result<T> = std::result::Result<T, SmelterError>;
