//! Domain models for the Custform pipeline.
//!
//! - [`UserRecord`] - validated and enriched customer, one per accepted row
//! - [`LoyaltyLevel`] - spend tier derived from the amount spent

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Loyalty Level
// =============================================================================

/// Spend tier of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoyaltyLevel {
    /// Under 100.00
    Bronze,
    /// 100.00 up to and including 500.00
    Silver,
    /// Over 500.00
    Gold,
}

impl LoyaltyLevel {
    /// Classify an amount already rounded to cents.
    pub fn from_amount(amount: f64) -> Self {
        if amount < 100.0 {
            Self::Bronze
        } else if amount <= 500.0 {
            Self::Silver
        } else {
            Self::Gold
        }
    }

    /// Display value, as written to the output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

impl fmt::Display for LoyaltyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User Record
// =============================================================================

/// A customer row that passed validation.
///
/// Only the row validator builds these, so every field is already trimmed,
/// normalized and checked. There are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    id: u64,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(serialize_with = "serialize_iso8601")]
    signup_date: DateTime<Utc>,
    amount_spent: f64,
    country_code: String,
    country_name: String,
    loyalty_level: LoyaltyLevel,
}

impl UserRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: u64,
        first_name: String,
        last_name: String,
        email: String,
        signup_date: DateTime<Utc>,
        amount_spent: f64,
        country_code: String,
        country_name: String,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            signup_date,
            amount_spent,
            country_code,
            country_name,
            loyalty_level: LoyaltyLevel::from_amount(amount_spent),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn signup_date(&self) -> DateTime<Utc> {
        self.signup_date
    }

    /// Signup instant as written to the output, e.g. `2023-11-15T10:30:00+00:00`.
    pub fn signup_date_iso(&self) -> String {
        self.signup_date.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn amount_spent(&self) -> f64 {
        self.amount_spent
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    pub fn loyalty_level(&self) -> LoyaltyLevel {
        self.loyalty_level
    }
}

fn serialize_iso8601<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, false))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample(amount: f64) -> UserRecord {
        UserRecord::new(
            42,
            "Zoë".into(),
            "Doe".into(),
            "zoe@example.com".into(),
            Utc.with_ymd_and_hms(2023, 11, 15, 10, 30, 0).unwrap(),
            amount,
            "FR".into(),
            "France".into(),
        )
    }

    #[test]
    fn test_loyalty_bronze() {
        assert_eq!(LoyaltyLevel::from_amount(0.0), LoyaltyLevel::Bronze);
        assert_eq!(LoyaltyLevel::from_amount(50.0), LoyaltyLevel::Bronze);
        assert_eq!(LoyaltyLevel::from_amount(99.99), LoyaltyLevel::Bronze);
    }

    #[test]
    fn test_loyalty_silver() {
        assert_eq!(LoyaltyLevel::from_amount(100.0), LoyaltyLevel::Silver);
        assert_eq!(LoyaltyLevel::from_amount(250.0), LoyaltyLevel::Silver);
        assert_eq!(LoyaltyLevel::from_amount(500.0), LoyaltyLevel::Silver);
    }

    #[test]
    fn test_loyalty_gold() {
        assert_eq!(LoyaltyLevel::from_amount(500.01), LoyaltyLevel::Gold);
        assert_eq!(LoyaltyLevel::from_amount(1000.0), LoyaltyLevel::Gold);
        assert_eq!(LoyaltyLevel::from_amount(9999.99), LoyaltyLevel::Gold);
    }

    #[test]
    fn test_loyalty_values() {
        assert_eq!(LoyaltyLevel::Bronze.to_string(), "Bronze");
        assert_eq!(LoyaltyLevel::Silver.as_str(), "Silver");
        assert_eq!(json!(LoyaltyLevel::Gold), json!("Gold"));
    }

    #[test]
    fn test_record_derives_loyalty() {
        assert_eq!(sample(500.01).loyalty_level(), LoyaltyLevel::Gold);
        assert_eq!(sample(10.0).loyalty_level(), LoyaltyLevel::Bronze);
    }

    #[test]
    fn test_record_serialization() {
        let value = serde_json::to_value(sample(250.5)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 42,
                "first_name": "Zoë",
                "last_name": "Doe",
                "email": "zoe@example.com",
                "signup_date": "2023-11-15T10:30:00+00:00",
                "amount_spent": 250.5,
                "country_code": "FR",
                "country_name": "France",
                "loyalty_level": "Silver"
            })
        );
    }

    #[test]
    fn test_field_order_is_stable() {
        let json = serde_json::to_string(&sample(12.0)).unwrap();
        let id = json.find("\"id\"").unwrap();
        let email = json.find("\"email\"").unwrap();
        let loyalty = json.find("\"loyalty_level\"").unwrap();
        assert!(id < email && email < loyalty);
    }
}
