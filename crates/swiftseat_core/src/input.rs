//! Form-input validation helpers.
//!
//! # Responsibility
//! - Turn raw text fields into typed, constrained values.
//! - Signal rejection with a field-specific, human-readable message.
//!
//! # Invariants
//! - The repository layer never receives unvalidated primitives; every
//!   user-entered value passes through one of these functions first.
//! - These helpers never touch the store; `InputError` is raised here and
//!   nowhere else in the core.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed entry format for departure timestamps.
pub const DEPARTURE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

// Leading + or digit, then at least six more digits/spaces/hyphens.
static CONTACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\d][\d\s-]{6,}$").expect("valid contact regex"));

/// Rejection of a raw form field, with the offending field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Field was empty or whitespace-only.
    Required(&'static str),
    /// Field must be a whole number.
    NotAWholeNumber(&'static str),
    /// Field must be strictly greater than zero.
    NotPositive(&'static str),
    /// Field must be a real number.
    NotANumber(&'static str),
    /// Field must not be negative.
    Negative(&'static str),
    /// Field must match [`DEPARTURE_INPUT_FORMAT`].
    BadTimestamp(&'static str),
    /// Contact string failed the phone-like pattern.
    BadContact,
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required."),
            Self::NotAWholeNumber(field) => write!(f, "{field} must be a whole number."),
            Self::NotPositive(field) => write!(f, "{field} must be greater than zero."),
            Self::NotANumber(field) => write!(f, "{field} must be a valid number."),
            Self::Negative(field) => write!(f, "{field} cannot be negative."),
            Self::BadTimestamp(field) => {
                write!(f, "{field} must match the format YYYY-MM-DD HH:MM")
            }
            Self::BadContact => write!(
                f,
                "Contact number must start with + or digits and contain at least 7 digits."
            ),
        }
    }
}

impl Error for InputError {}

/// Requires trimmed, non-empty text.
pub fn require_text(field: &'static str, raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Parses a whole number strictly greater than zero.
pub fn parse_seat_count(field: &'static str, raw: &str) -> Result<u32, InputError> {
    let text = require_text(field, raw)?;
    let number: i64 = text
        .parse()
        .map_err(|_| InputError::NotAWholeNumber(field))?;
    if number <= 0 {
        return Err(InputError::NotPositive(field));
    }
    u32::try_from(number).map_err(|_| InputError::NotAWholeNumber(field))
}

/// Parses a real number that is not negative.
pub fn parse_price(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let text = require_text(field, raw)?;
    let number: f64 = text.parse().map_err(|_| InputError::NotANumber(field))?;
    if number < 0.0 {
        return Err(InputError::Negative(field));
    }
    Ok(number)
}

/// Parses a departure timestamp in the fixed `YYYY-MM-DD HH:MM` format.
pub fn parse_departure(field: &'static str, raw: &str) -> Result<NaiveDateTime, InputError> {
    let text = require_text(field, raw)?;
    NaiveDateTime::parse_from_str(&text, DEPARTURE_INPUT_FORMAT)
        .map_err(|_| InputError::BadTimestamp(field))
}

/// Validates a phone-like contact string.
pub fn parse_contact(raw: &str) -> Result<String, InputError> {
    let text = require_text("Contact", raw)?;
    if !CONTACT_RE.is_match(&text) {
        return Err(InputError::BadContact);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_contact, parse_departure, parse_price, parse_seat_count, require_text, InputError,
    };

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("Origin", "  City A "), Ok("City A".to_string()));
        assert_eq!(
            require_text("Origin", "   "),
            Err(InputError::Required("Origin"))
        );
    }

    #[test]
    fn seat_count_accepts_positive_whole_numbers_only() {
        assert_eq!(parse_seat_count("Seats", "12"), Ok(12));
        assert_eq!(
            parse_seat_count("Seats", "0"),
            Err(InputError::NotPositive("Seats"))
        );
        assert_eq!(
            parse_seat_count("Seats", "-3"),
            Err(InputError::NotPositive("Seats"))
        );
        assert_eq!(
            parse_seat_count("Seats", "4.5"),
            Err(InputError::NotAWholeNumber("Seats"))
        );
    }

    #[test]
    fn price_rejects_negative_and_garbage() {
        assert_eq!(parse_price("Price", "25.0"), Ok(25.0));
        assert_eq!(parse_price("Price", "0"), Ok(0.0));
        assert_eq!(
            parse_price("Price", "-1"),
            Err(InputError::Negative("Price"))
        );
        assert_eq!(
            parse_price("Price", "cheap"),
            Err(InputError::NotANumber("Price"))
        );
    }

    #[test]
    fn departure_requires_fixed_format() {
        let parsed = parse_departure("Departure", "2024-05-01 10:00").unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M").to_string(), "2024-05-01T10:00");
        assert_eq!(
            parse_departure("Departure", "01/05/2024 10:00"),
            Err(InputError::BadTimestamp("Departure"))
        );
    }

    #[test]
    fn contact_pattern_edge_cases() {
        assert!(parse_contact("+1234567890").is_ok());
        assert!(parse_contact("020 7946-0958").is_ok());
        assert_eq!(parse_contact("123456"), Err(InputError::BadContact));
        assert_eq!(parse_contact("call me"), Err(InputError::BadContact));
        assert_eq!(parse_contact(""), Err(InputError::Required("Contact")));
    }

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            InputError::Required("Bus number").to_string(),
            "Bus number is required."
        );
        assert!(InputError::BadContact.to_string().contains("Contact number"));
    }
}
