//! Client-side credential validation.
//!
//! Defense in depth, not authoritative: the remote authority re-validates
//! every signup. The point of checking here is that malformed input never
//! produces a remote call at all.
//!
//! Bounds and the email shape are the same ones the authority enforces:
//! email must match `local@domain.tld` and be 3-255 characters, password
//! must be 6-255 characters.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{EMAIL_MAX_LEN, EMAIL_MIN_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
use crate::error::ApiError;

/// `local@domain.tld`: no whitespace, no extra `@`, at least one dot in
/// the domain part.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Validates an email address shape and length.
///
/// # Errors
///
/// [`ApiError::Validation`] with `field = "email"` when the address is out
/// of bounds or does not look like `local@domain.tld`.
///
/// # Examples
///
/// ```
/// use tasksync::validate::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("a@b").is_err()); // no dot in the domain
/// ```
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let len = email.chars().count();
    if len < EMAIL_MIN_LEN || len > EMAIL_MAX_LEN {
        return Err(ApiError::Validation {
            field: "email",
            reason: format!("must be {EMAIL_MIN_LEN}-{EMAIL_MAX_LEN} characters"),
        });
    }
    if !email_pattern().is_match(email) {
        return Err(ApiError::Validation {
            field: "email",
            reason: "must look like local@domain.tld".to_string(),
        });
    }
    Ok(())
}

/// Validates a password's length. Content is unconstrained.
///
/// # Errors
///
/// [`ApiError::Validation`] with `field = "password"` when the length is
/// out of bounds.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN || len > PASSWORD_MAX_LEN {
        return Err(ApiError::Validation {
            field: "password",
            reason: format!("must be {PASSWORD_MIN_LEN}-{PASSWORD_MAX_LEN} characters"),
        });
    }
    Ok(())
}

/// Validates a signup credential pair, email first.
///
/// # Errors
///
/// The first [`ApiError::Validation`] encountered.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    validate_email(email)?;
    validate_password(password)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        for email in ["a@b.c", "ada.lovelace@example.com", "x+tag@sub.domain.org"] {
            assert!(validate_email(email).is_ok(), "{email} should validate");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "plain",
            "@domain.tld",
            "local@",
            "a@b",
            "two@@example.com",
            "spaces in@example.com",
            "local@domain .tld",
        ] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn email_length_bounds() {
        // 255 characters total: accepted.
        let local = "a".repeat(255 - "@example.com".len());
        let at_max = format!("{local}@example.com");
        assert_eq!(at_max.chars().count(), 255);
        assert!(validate_email(&at_max).is_ok());

        // 256 characters: rejected on length alone.
        let local = "a".repeat(256 - "@example.com".len());
        let over_max = format!("{local}@example.com");
        assert_eq!(over_max.chars().count(), 256);
        assert!(validate_email(&over_max).is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password(&"p".repeat(5)).is_err());
        assert!(validate_password(&"p".repeat(6)).is_ok());
        assert!(validate_password(&"p".repeat(255)).is_ok());
        assert!(validate_password(&"p".repeat(256)).is_err());
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // Six multibyte characters: within bounds even though the byte
        // length is larger.
        assert!(validate_password("ÿÿÿÿÿÿ").is_ok());
    }

    #[test]
    fn credentials_reports_email_first() {
        let err = validate_credentials("bad", "tiny").unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "email", .. }));
    }
}
