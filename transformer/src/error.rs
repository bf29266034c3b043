//! Error types for the Custform transformation pipeline.
//!
//! Errors come in two tiers:
//!
//! - [`ValidationError`] - one bad row. The stream records it and moves on.
//! - [`CountryError`] and [`PipelineError`] - the run cannot continue.
//!
//! [`RowError`] is what the row validator returns: either a recoverable
//! [`ValidationError`] or a fatal [`CountryError`] raised while the lookup
//! table was being loaded. Conversions are `From` based so `?` works across
//! layers.

use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Country Reference Errors
// =============================================================================

/// Errors while loading the country reference table.
#[derive(Debug, Error)]
pub enum CountryError {
    /// Reference file does not exist.
    #[error("Countries file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reference file exists but could not be read.
    #[error("Could not read countries file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference file is not valid JSON.
    #[error("Could not parse countries file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reference file is JSON but not a code -> name mapping.
    #[error("Invalid countries file format in {}: {}", .path.display(), .errors.join("; "))]
    InvalidFormat { path: PathBuf, errors: Vec<String> },
}

// =============================================================================
// Row Validation Errors
// =============================================================================

/// A single row failed validation.
///
/// The `Display` output is the user facing message; [`ValidationError::payload`]
/// carries the offending data for diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid CSV row format")]
    RowFormat { row: Vec<String> },

    #[error("Invalid ID format")]
    InvalidId { value: String },

    #[error("Name cannot be empty")]
    EmptyName { field: &'static str },

    #[error("Invalid email format")]
    InvalidEmail { value: String },

    #[error("Invalid date format")]
    InvalidDate { value: String },

    #[error("Invalid amount format")]
    InvalidAmount { value: String },

    #[error("Amount cannot be negative")]
    NegativeAmount { value: String },

    #[error("Amount spent is below minimum")]
    BelowMinimum { amount: f64, row: Vec<String> },

    #[error("Invalid country code")]
    UnknownCountry { code: String, row: Vec<String> },
}

impl ValidationError {
    /// Diagnostic data attached to the failure.
    pub fn payload(&self) -> Value {
        match self {
            Self::RowFormat { row } => json!(row),
            Self::InvalidId { value } => json!({ "id": value }),
            Self::EmptyName { field } => json!({ "field": field }),
            Self::InvalidEmail { value } => json!({ "email": value }),
            Self::InvalidDate { value } => json!({ "date": value }),
            Self::InvalidAmount { value } | Self::NegativeAmount { value } => {
                json!({ "amount_spent": value })
            }
            Self::BelowMinimum { row, .. } => json!(row),
            Self::UnknownCountry { row, .. } => json!(row),
        }
    }
}

/// Outcome of validating one row when it did not produce a record.
#[derive(Debug, Error)]
pub enum RowError {
    /// The row is bad; skip it and continue.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The lookup table could not be loaded; the run must stop.
    #[error(transparent)]
    Country(#[from] CountryError),
}

impl RowError {
    /// `true` when the stream may skip the row and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the streaming pipeline.
///
/// Every variant aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input CSV does not exist.
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input CSV could not be opened.
    #[error("Could not open file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output JSON could not be created.
    #[error("Could not create output file {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV or a read failure mid-stream.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Write failure on the output sink.
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),

    /// A valid record could not be encoded.
    #[error("Could not encode record {id} to JSON: {source}")]
    Encode {
        id: u64,
        #[source]
        source: serde_json::Error,
    },

    /// Country reference data is unusable.
    #[error("Country data error: {0}")]
    Country(#[from] CountryError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for country lookup operations.
pub type CountryResult<T> = Result<T, CountryError>;

/// Result type for row validation.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
