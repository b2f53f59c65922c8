//! User validation rules shared by request types

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

pub const MIN_USERNAME_LENGTH: u64 = 3;
pub const MAX_USERNAME_LENGTH: u64 = 50;
pub const MIN_PASSWORD_LENGTH: u64 = 8;
pub const MAX_PASSWORD_LENGTH: u64 = 128;
pub const MAX_NAME_LENGTH: u64 = 100;
pub const MAX_BIO_LENGTH: u64 = 1000;

/// Digits with optional leading `+`, spaces, dashes and parentheses
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{5,20}$").expect("phone regex is valid"));

/// Username may only contain alphanumeric characters, underscores, and hyphens
pub fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    match username
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
    {
        Some(c) => {
            let mut error = ValidationError::new("username_chars");
            error.message = Some(
                format!(
                    "contains invalid character '{}'; only letters, digits, '_' and '-' are allowed",
                    c
                )
                .into(),
            );
            Err(error)
        }
        None => Ok(()),
    }
}

/// Birth date must not be in the future
pub fn validate_birth_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        let mut error = ValidationError::new("birth_date");
        error.message = Some("must not be in the future".into());
        return Err(error);
    }

    Ok(())
}

/// Rejects strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }

    Ok(())
}
