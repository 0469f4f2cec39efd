//! Field checks shared by the entity kinds
//!
//! Fields are written space-separated, so no text field may contain
//! whitespace. Limits are in characters.

use std::sync::OnceLock;

use regex::Regex;

pub const NAME_MAX: usize = 49;
pub const TITLE_MAX: usize = 99;
pub const EMAIL_MAX: usize = 99;
pub const PHONE_MAX: usize = 14;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9]+$").expect("phone pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
    })
}

/// Non-empty, whitespace-free, at most `max` characters.
pub fn text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(format!("{} must not contain whitespace", field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(format!("{} is {} characters, limit is {}", field, len, max));
    }
    Ok(())
}

/// Digits with an optional leading `+`, 1 to 14 characters.
pub fn phone(field: &str, value: &str) -> Result<(), String> {
    text(field, value, PHONE_MAX)?;
    if !phone_pattern().is_match(value) {
        return Err(format!(
            "{} '{}' may only contain digits and an optional leading +",
            field, value
        ));
    }
    Ok(())
}

/// `local@domain.tld`, at most 99 characters.
pub fn email(field: &str, value: &str) -> Result<(), String> {
    text(field, value, EMAIL_MAX)?;
    if !email_pattern().is_match(value) {
        return Err(format!("{} '{}' is not an email address", field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_limits() {
        assert!(text("name", "CS", NAME_MAX).is_ok());
        assert!(text("name", "", NAME_MAX).is_err());
        assert!(text("name", "Computer Science", TITLE_MAX).is_err());
        assert!(text("name", &"x".repeat(50), NAME_MAX).is_err());
        assert!(text("name", &"x".repeat(49), NAME_MAX).is_ok());
    }

    #[test]
    fn test_phone_shapes() {
        assert!(phone("phone", "12345").is_ok());
        assert!(phone("phone", "+905551234567").is_ok());
        assert!(phone("phone", "555-1234").is_err());
        assert!(phone("phone", "12+3").is_err());
        assert!(phone("phone", "123456789012345").is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(email("email", "ada@uni.edu").is_ok());
        assert!(email("email", "ada.uni.edu").is_err());
        assert!(email("email", "ada@uni").is_err());
        assert!(email("email", "a@b@c.d").is_err());
    }
}
