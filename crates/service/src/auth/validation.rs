//! Request field checks shared by the auth workflows.

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles")
});

/// Trimmed value of a required field; blank counts as missing.
pub fn required(field: &Option<String>) -> Result<&str, AuthError> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::validation(ALL_FIELDS_REQUIRED)),
    }
}

/// Passwords are taken verbatim (no trimming) but must be non-empty.
pub fn required_secret(field: &Option<String>) -> Result<&str, AuthError> {
    match field.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::validation(ALL_FIELDS_REQUIRED)),
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AuthError::validation("Invalid email format"))
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str, field: &str) -> Result<NaiveTime, AuthError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AuthError::validation(format!("{field} must be a time of day (HH:MM)")))
}

pub fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}
