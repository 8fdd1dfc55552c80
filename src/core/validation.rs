use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Minimum trimmed query length, in characters
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum trimmed query length, in characters
pub const MAX_QUERY_LEN: usize = 100;

/// Reasons a raw skill query is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Skill must be a string")]
    TypeMismatch,

    #[error("Search term must be at least 2 characters")]
    TooShort,

    #[error("Search term too long (max 100 characters)")]
    TooLong,

    #[error("Search term contains invalid characters")]
    InvalidCharacters,
}

/// A trimmed skill query that passed validation
///
/// Only letters, digits, spaces and hyphens can appear, so the value is safe
/// to splice into a LIKE pattern or a REST filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSkill(String);

impl ValidSkill {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a raw skill query taken straight from the request body
pub fn validate(raw: &Value) -> Result<ValidSkill, ValidationError> {
    match raw {
        Value::String(text) => validate_str(text),
        _ => Err(ValidationError::TypeMismatch),
    }
}

/// Validate a skill query that is already known to be text
pub fn validate_str(raw: &str) -> Result<ValidSkill, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();

    if len < MIN_QUERY_LEN {
        return Err(ValidationError::TooShort);
    }

    if len > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong);
    }

    if !trimmed.chars().all(is_allowed_char) {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(ValidSkill(trimmed.to_string()))
}

#[inline]
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-'
}
