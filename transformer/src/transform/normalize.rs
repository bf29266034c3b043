//! Field-level parsing and normalization.
//!
//! Small pure functions, one per column type. Each returns `None` when the
//! raw value is unusable; the validator turns that into the right message.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Address syntax: dot-atom local part, dotted hostname with an alphabetic TLD.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern is valid")
});

/// Plain decimal or scientific notation, optional sign.
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// Date-times carrying an offset (`Z` is rewritten to `+00:00` first)
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Date-times without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest id representable after truncating a float (2^64).
const ID_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Positive integer id.
///
/// Any numeric value is accepted and truncated toward zero, so `"12.7"` is 12
/// and `"1e3"` is 1000. Plain digit strings are read exactly.
pub fn parse_id(raw: &str) -> Option<u64> {
    let value = raw.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.parse::<u64>().ok().filter(|id| *id > 0);
    }

    let number = parse_amount(value)?.trunc();
    if number < 1.0 || number >= ID_LIMIT {
        return None;
    }
    Some(number as u64)
}

/// Trim, lowercase, then uppercase the first character only.
///
/// `"anne-marie"` becomes `"Anne-marie"`, `"O'CONNOR"` becomes `"O'connor"`.
pub fn normalize_name(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    let mut chars = lower.chars();
    let first = chars.next()?;

    let mut name: String = first.to_uppercase().collect();
    name.push_str(chars.as_str());
    Some(name)
}

/// Trimmed, syntax checked and lowercased email.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim();
    if email.len() > MAX_EMAIL_LEN {
        return None;
    }

    let local_len = email.find('@')?;
    if local_len > MAX_LOCAL_PART_LEN || !EMAIL_RE.is_match(email) {
        return None;
    }

    Some(email.to_lowercase())
}

/// Parse an ISO-8601 date or date-time and convert it to UTC.
///
/// Values without an offset are taken to be UTC already; a plain date means
/// midnight.
pub fn parse_signup_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    let with_offset = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => value.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(&with_offset, format) {
            return Some(date.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Some(date.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Parse a numeric amount. Infinity and NaN spellings are not numbers here.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if !NUMBER_RE.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// Round the written decimal to 2 places, half away from zero.
///
/// Rounding works on the digits as typed, not on their binary approximation,
/// so `"9.995"` gives 10.00 and `"1.005"` gives 1.01. `amount` is the parsed
/// value of `raw` and is used when the text does not fit a `Decimal`.
pub fn round_cents(raw: &str, amount: f64) -> f64 {
    let value = raw.trim();
    let parsed = if value.contains(|c| c == 'e' || c == 'E') {
        Decimal::from_scientific(value)
    } else {
        Decimal::from_str(value)
    };

    parsed
        .ok()
        .or_else(|| Decimal::from_f64(amount))
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_f64())
        .unwrap_or(amount)
}

/// Trimmed, uppercase country code.
pub fn normalize_country_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
