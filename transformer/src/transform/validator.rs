//! Row validation and enrichment.
//!
//! Turns one raw 7-field row into a [`UserRecord`] or explains why it can't.
//! Checks run in column order and stop at the first failure.

use crate::country::{CountryLookup, CountryResolver};
use crate::error::{RowResult, ValidationError};
use crate::models::UserRecord;
use crate::parser::FIELD_COUNT;

use super::normalize::{
    normalize_country_code, normalize_email, normalize_name, parse_amount, parse_id,
    parse_signup_date, round_cents,
};

/// Smallest accepted amount spent, after rounding.
pub const MINIMUM_AMOUNT: f64 = 10.0;

/// Validates raw rows against the customer rules.
///
/// The country resolver is injected once and shared by every row; pass
/// `&CountryLookup` to share one table between several validators.
#[derive(Debug)]
pub struct RowValidator<C = CountryLookup> {
    countries: C,
}

impl<C: CountryResolver> RowValidator<C> {
    pub fn new(countries: C) -> Self {
        Self { countries }
    }

    pub fn countries(&self) -> &C {
        &self.countries
    }

    /// Validate, normalize and enrich one row.
    ///
    /// # Returns
    /// * `Ok(UserRecord)` for a good row
    /// * `Err(RowError::Invalid)` for a bad row, safe to skip
    /// * `Err(RowError::Country)` when the country table can't be loaded
    pub fn validate<S: AsRef<str>>(&self, row: &[S]) -> RowResult<UserRecord> {
        if row.len() != FIELD_COUNT {
            return Err(ValidationError::RowFormat { row: to_owned_row(row) }.into());
        }

        let [id, first_name, last_name, email, signup_date, amount_spent, country_code] =
            [0, 1, 2, 3, 4, 5, 6].map(|i| row[i].as_ref());

        let id = parse_id(id).ok_or_else(|| ValidationError::InvalidId {
            value: id.trim().to_string(),
        })?;

        let first_name = normalize_name(first_name)
            .ok_or(ValidationError::EmptyName { field: "first_name" })?;
        let last_name = normalize_name(last_name)
            .ok_or(ValidationError::EmptyName { field: "last_name" })?;

        let email = normalize_email(email).ok_or_else(|| ValidationError::InvalidEmail {
            value: email.trim().to_string(),
        })?;

        let signup_date =
            parse_signup_date(signup_date).ok_or_else(|| ValidationError::InvalidDate {
                value: signup_date.trim().to_string(),
            })?;

        let amount_spent = self.amount(amount_spent)?;
        if amount_spent < MINIMUM_AMOUNT {
            return Err(ValidationError::BelowMinimum {
                amount: amount_spent,
                row: to_owned_row(row),
            }
            .into());
        }

        let country_code = normalize_country_code(country_code);
        let country_name = match self.countries.country_name(&country_code)? {
            Some(name) => name,
            None => {
                return Err(ValidationError::UnknownCountry {
                    code: country_code,
                    row: to_owned_row(row),
                }
                .into())
            }
        };

        Ok(UserRecord::new(
            id,
            first_name,
            last_name,
            email,
            signup_date,
            amount_spent,
            country_code,
            country_name,
        ))
    }

    /// Numeric, non-negative, rounded to cents.
    fn amount(&self, raw: &str) -> Result<f64, ValidationError> {
        let value = raw.trim();
        let amount = parse_amount(value).ok_or_else(|| ValidationError::InvalidAmount {
            value: value.to_string(),
        })?;

        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount {
                value: value.to_string(),
            });
        }

        Ok(round_cents(value, amount))
    }
}

fn to_owned_row<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    row.iter().map(|field| field.as_ref().to_string()).collect()
}
