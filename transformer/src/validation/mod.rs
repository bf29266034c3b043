//! JSON Schema validation for reference data.
//!
//! The country table is user supplied, so it is checked against an embedded
//! draft 7 schema (`schemas/countries.schema.json`) before it is trusted:
//!
//! - top level must be a non-empty object
//! - keys must be uppercase letter codes, two letters or more
//! - values must be non-empty strings
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use custform::validation::validate_country_table;
//!
//! assert!(validate_country_table(&json!({ "US": "United States" })).is_ok());
//! assert!(validate_country_table(&json!(["US"])).is_err());
//! ```

use serde_json::Value;

/// Embedded country reference schema.
const COUNTRIES_SCHEMA: &str = include_str!("../../schemas/countries.schema.json");

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a parsed reference file against the country table schema.
pub fn validate_country_table(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(COUNTRIES_SCHEMA)
        .map_err(|e| vec![format!("Invalid embedded schema: {}", e)])?;
    validate(&schema, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_table() {
        let table = json!({
            "US": "United States",
            "FR": "France",
            "GBR": "United Kingdom"
        });
        assert!(validate_country_table(&table).is_ok());
    }

    #[test]
    fn test_array_rejected() {
        assert!(validate_country_table(&json!(["US", "FR"])).is_err());
    }

    #[test]
    fn test_lowercase_code_rejected() {
        let errors = validate_country_table(&json!({ "us": "United States" })).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_single_letter_code_rejected() {
        assert!(validate_country_table(&json!({ "U": "Nowhere" })).is_err());
    }

    #[test]
    fn test_non_string_name_rejected() {
        assert!(validate_country_table(&json!({ "US": 1 })).is_err());
        assert!(validate_country_table(&json!({ "US": "" })).is_err());
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(validate_country_table(&json!({})).is_err());
    }
}
