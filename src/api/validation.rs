//! Input validation for API requests.
//!
//! Validators return `Result<(), String>` so handlers can map failures to
//! a 400 with the message in the envelope.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses. Intentionally loose; the
    /// unique index on users.email is the real gatekeeper.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Regex for validating category slugs (lowercase alphanumeric with dashes)
    static ref SLUG_REGEX: Regex = Regex::new(
        r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$"
    ).unwrap();
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }
    if email.len() > 254 {
        return Err("email is too long (max 254 characters)".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len < 2 {
        return Err("username is too short (min 2 characters)".to_string());
    }
    if len > 32 {
        return Err("username is too long (max 32 characters)".to_string());
    }
    if username.trim() != username {
        return Err("username cannot start or end with whitespace".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 6 {
        return Err("password is too short (min 6 characters)".to_string());
    }
    if password.len() > 128 {
        return Err("password is too long (max 128 characters)".to_string());
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("slug is required".to_string());
    }
    if slug.len() > 63 {
        return Err("slug is too long (max 63 characters)".to_string());
    }
    if !SLUG_REGEX.is_match(slug) {
        return Err(
            "slug must be lowercase alphanumeric with dashes, starting and ending with alphanumeric"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title is required".to_string());
    }
    if title.chars().count() > 200 {
        return Err("title is too long (max 200 characters)".to_string());
    }
    Ok(())
}

pub fn validate_comment_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("content is required".to_string());
    }
    if content.chars().count() > 2000 {
        return Err("content is too long (max 2000 characters)".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username(" padded ").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("tech").is_ok());
        assert!(validate_slug("world-news").is_ok());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_validate_title_and_content() {
        assert!(validate_title("A headline").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_comment_content("nice read").is_ok());
        assert!(validate_comment_content("").is_err());
    }
}
