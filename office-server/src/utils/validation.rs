//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Names, titles, positions, departments
pub const MAX_NAME_LEN: usize = 200;

/// Reasons, feedback, comments, descriptions
pub const MAX_NOTE_LEN: usize = 2000;

/// Announcement bodies
pub const MAX_BODY_LEN: usize = 10_000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_PASSWORD_LEN: usize = 6;

/// URLs / attachment keys
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!("Invalid email: {email}")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(shared::ErrorCode::PasswordTooShort));
    }
    validate_required_text(password, "password", MAX_PASSWORD_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("  ", "name", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "name", 10).is_err());
        assert!(validate_required_text("Jane", "name", 10).is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("jane@office.io").is_ok());
        assert!(validate_email("jane.office.io").is_err());
        assert!(validate_email("@office.io").is_err());
        assert!(validate_email("jane@localhost").is_err());
    }

    #[test]
    fn short_password_has_its_own_code() {
        let err = validate_password("abc").unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::PasswordTooShort);
    }
}
