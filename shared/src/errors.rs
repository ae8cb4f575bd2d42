//! Error types shared between the backend and its clients

use thiserror::Error;

/// Input validation failures
///
/// All of these surface to clients as HTTP 400.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid todo: {0}")]
    InvalidTodo(String),
}

/// Authentication error types
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. The two cases are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed, unsigned, forged or revoked token
    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}
