//! Input validation functions
//!
//! Registration and todo input rules. Email format checking is delegated to
//! the `validator` crate.

use crate::errors::ValidationError;
use validator::ValidateEmail;

/// Minimum accepted password length, in bytes
pub const MIN_PASSWORD_LEN: usize = 6;
/// Maximum accepted password length, in bytes.
///
/// bcrypt only reads the first 72 bytes; anything longer would let two
/// passwords sharing that prefix verify against the same hash.
pub const MAX_PASSWORD_LEN: usize = 72;
/// Maximum accepted email length
pub const MAX_EMAIL_LEN: usize = 255;

/// Canonical stored form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

/// Validate an already-normalized email
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::InvalidEmail("Email too long".to_string()));
    }
    // Require a dotted domain, like most mail front-ends do
    let has_dotted_domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !has_dotted_domain || !email.validate_email() {
        return Err(ValidationError::InvalidEmail(format!(
            "{} is not a valid email",
            email
        )));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Trim todo text and reject it if nothing is left
pub fn normalize_todo_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidTodo("Text cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("test@example.com")]
    #[case("user.name@domain.co.uk")]
    #[case("a@x.com")]
    fn test_valid_emails(#[case] email: &str) {
        assert!(validate_email(email).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("invalid")]
    #[case("invalidEmail")]
    #[case("no@dot")]
    #[case("spaces in@email.com")]
    #[case("trailing@dot.")]
    fn test_invalid_emails(#[case] email: &str) {
        assert!(matches!(
            validate_email(email),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_normalize_email_trims() {
        assert_eq!(normalize_email("  a@x.com \n"), "a@x.com");
        assert!(validate_email(&normalize_email("  a@x.com  ")).is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password("123").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(validate_password(&"a".repeat(73)).is_err());
    }

    #[test]
    fn test_normalize_todo_text() {
        assert_eq!(normalize_todo_text("  buy milk ").unwrap(), "buy milk");
        assert!(normalize_todo_text("   ").is_err());
        assert!(normalize_todo_text("").is_err());
    }

    proptest! {
        #[test]
        fn prop_password_length_bounds(len in 0usize..200) {
            let password = "p".repeat(len);
            let ok = validate_password(&password).is_ok();
            prop_assert_eq!(ok, (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len));
        }

        #[test]
        fn prop_passwords_past_bcrypt_limit_rejected(password in "[ -~]{73,128}") {
            prop_assert!(matches!(
                validate_password(&password),
                Err(ValidationError::InvalidPassword(_))
            ));
        }

        #[test]
        fn prop_multibyte_password_counted_in_bytes(len in 19usize..40) {
            // 4-byte scalar: 19 of them already exceed 72 bytes
            let password = "\u{1F600}".repeat(len);
            prop_assert!(validate_password(&password).is_err());
        }

        #[test]
        fn prop_surrounding_whitespace_never_matters(
            local in "[a-z]{1,10}",
            pad_left in " {0,3}",
            pad_right in " {0,3}",
        ) {
            let raw = format!("{}{}@example.com{}", pad_left, local, pad_right);
            prop_assert!(validate_email(&normalize_email(&raw)).is_ok());
        }
    }
}
