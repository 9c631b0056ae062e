use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const USERNAME_MIN: usize = 5;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 64;
pub const TEXT_MAX: usize = 500;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Fails with "All fields are required" when any value is blank.
pub fn require_fields(values: &[&str]) -> AppResult<()> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(AppError::validation("All fields are required"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    let len = char_len(username);
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    let len = char_len(password);
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> AppResult<()> {
    if char_len(bio) > TEXT_MAX {
        return Err(AppError::validation(format!(
            "Bio cannot exceed {TEXT_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> AppResult<()> {
    if char_len(description) > TEXT_MAX {
        return Err(AppError::validation(format!(
            "Description cannot exceed {TEXT_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_comment(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Comment cannot be empty"));
    }
    if char_len(content) > TEXT_MAX {
        return Err(AppError::validation(format!(
            "Comment cannot exceed {TEXT_MAX} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(validate_username("abcd").is_err());
        assert!(validate_username("abcde").is_ok());
        assert!(validate_username(&"a".repeat(32)).is_ok());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn username_counts_characters_not_bytes() {
        // five Cyrillic letters are ten bytes
        assert!(validate_username("Петро").is_ok());
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"p".repeat(64)).is_ok());
        assert!(validate_password(&"p".repeat(65)).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("artist@example.com"));
        assert!(!is_valid_email("artist@example"));
        assert!(!is_valid_email("no at sign.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn text_limits() {
        assert!(validate_bio(&"b".repeat(500)).is_ok());
        assert!(validate_bio(&"b".repeat(501)).is_err());
        assert!(validate_description(&"d".repeat(501)).is_err());
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment("nice!").is_ok());
        assert!(validate_comment(&"c".repeat(501)).is_err());
    }

    #[test]
    fn require_fields_rejects_blank() {
        assert!(require_fields(&["a", "b"]).is_ok());
        let err = require_fields(&["a", "  "]).unwrap_err();
        assert!(err.to_string().contains("All fields are required"));
    }
}
