//! # Custform - customer CSV to enriched JSON
//!
//! Custform reads customer rows from a CSV export, validates and normalizes
//! each one, adds a loyalty tier and the country name, and streams the
//! result to a JSON array on disk.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│ JSON array  │
//! │  (7 cols)   │     │ (row by row)│     │ (+ country) │     │ (streamed)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Bad rows are logged, counted and skipped. Missing files or an unusable
//! country table stop the run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use custform::{run, TransformOptions};
//!
//! let summary = run(&TransformOptions::default())?;
//! println!("{} records, {} rows skipped", summary.processed, summary.errors);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types for both tiers
//! - [`models`] - Output records and loyalty levels
//! - [`parser`] - Streaming CSV source
//! - [`country`] - Country reference lookup
//! - [`validation`] - Reference data schema checks
//! - [`transform`] - Row validation and the streaming pipeline
//! - [`logs`] - Leveled run logs

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Reference data
pub mod country;
pub mod validation;

// Transformation
pub mod transform;

// Logs
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CountryError,
    CountryResult,
    PipelineError,
    PipelineResult,
    RowError,
    RowResult,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{LoyaltyLevel, UserRecord};

// =============================================================================
// Re-exports - Country lookup
// =============================================================================

pub use country::{CountryLookup, CountryResolver, DEFAULT_COUNTRIES_PATH};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    process,
    process_file,
    run,
    transform_file,
    write_json,
    RecordStream,
    RowDiagnostic,
    RowValidator,
    RunSummary,
    TransformOptions,
    MINIMUM_AMOUNT,
};
