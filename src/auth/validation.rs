use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

const MIN_FULL_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are stored and looked up trimmed and lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes and validates an email supplied by a client.
pub(crate) fn checked_email(email: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub(crate) fn checked_full_name(full_name: &str) -> Result<String, AppError> {
    let full_name = full_name.trim();
    if full_name.chars().count() < MIN_FULL_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Full name must be at least {MIN_FULL_NAME_LEN} characters"
        )));
    }
    Ok(full_name.to_string())
}

/// Applies to freshly chosen passwords only; login never re-checks strength.
pub(crate) fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::Validation(
            "Password must contain at least one letter and one number".into(),
        ));
    }
    Ok(())
}
