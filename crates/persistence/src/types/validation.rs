//! Field-level validation shared by the document types.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s\-()]+$").expect("valid phone regex"));

/// Trims `value` and fails if nothing is left.
pub fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::missing(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims an optional value, mapping blank input to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Trims, lowercases and checks the shape of an email address.
pub fn email(field: &str, value: &str) -> Result<String, ValidationError> {
    let normalized = required(field, value)?.to_lowercase();
    if EMAIL_PATTERN.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::invalid(field, "please provide a valid email"))
    }
}

/// Trims and checks a phone number: digits, spaces, dashes, parentheses, optional leading `+`.
pub fn phone(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = required(field, value)?;
    if PHONE_PATTERN.is_match(&trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::invalid(
            field,
            "please provide a valid phone number",
        ))
    }
}

/// Trims every entry of a list and drops blanks, keeping order.
pub fn string_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
