//! Request validation
//!
//! Each request type lists its own field-level failures; handlers call
//! [`ensure_valid`] before any domain logic runs.

use crate::core::error::{FieldError, PostlineError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

/// Implemented by every inbound request body
pub trait Validate {
    fn validate(&self) -> Vec<FieldError>;
}

/// Reject the request with every field error at once
pub fn ensure_valid<T: Validate>(input: &T) -> Result<()> {
    let errors = input.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PostlineError::ValidationError(errors))
    }
}

/// Present and not blank. Returns whether the check passed.
pub fn not_empty(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() => true,
        _ => {
            errors.push(FieldError::new(field, format!("{field} should not be empty")));
            false
        }
    }
}

/// Present and shaped like an email address
pub fn email(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) -> bool {
    if !not_empty(field, value, errors) {
        return false;
    }
    if value.is_some_and(|v| EMAIL_RE.is_match(v)) {
        true
    } else {
        errors.push(FieldError::new(field, format!("{field} must be an email")));
        false
    }
}

/// At least `min` characters
pub fn min_length(field: &str, value: &str, min: usize, errors: &mut Vec<FieldError>) -> bool {
    if value.chars().count() >= min {
        true
    } else {
        errors.push(FieldError::new(
            field,
            format!("{field} must be longer than or equal to {min} characters"),
        ));
        false
    }
}

/// At most `max` characters
pub fn max_length(field: &str, value: &str, max: usize, errors: &mut Vec<FieldError>) -> bool {
    if value.chars().count() <= max {
        true
    } else {
        errors.push(FieldError::new(
            field,
            format!("{field} must be shorter than or equal to {max} characters"),
        ));
        false
    }
}
