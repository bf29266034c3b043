//! Transformation module.
//!
//! - Normalize: field-level parsing helpers
//! - Validator: one raw row to one [`crate::models::UserRecord`]
//! - Pipeline: streaming CSV to JSON array

pub mod normalize;
pub mod pipeline;
pub mod validator;

pub use pipeline::*;
pub use validator::{RowValidator, MINIMUM_AMOUNT};
