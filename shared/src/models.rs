//! Data models for the Todo API

use crate::errors::AuthError;
use crate::types::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What a token record may be used for.
///
/// Only `auth` exists today; the tag is stored with every record so new
/// purposes can be added without a migration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    #[default]
    Auth,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Auth => "auth",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(TokenPurpose::Auth),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

/// One active session of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRecord {
    pub purpose: TokenPurpose,
    pub token: String,
}

impl TokenRecord {
    pub fn auth(token: impl Into<String>) -> Self {
        Self {
            purpose: TokenPurpose::Auth,
            token: token.into(),
        }
    }
}

/// User account
///
/// Deliberately not `Serialize`: the only outward form is [`UserProfile`].
#[derive(Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Active sessions, oldest first
    pub tokens: Vec<TokenRecord>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view of the account: identifier and email only
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
        }
    }

    /// Whether `token` is registered against this user for `purpose`
    pub fn has_token(&self, token: &str, purpose: TokenPurpose) -> bool {
        self.tokens
            .iter()
            .any(|record| record.purpose == purpose && record.token == token)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("tokens", &self.tokens.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Todo item owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Completion time in Unix epoch milliseconds
    pub completed_at: Option<i64>,
    pub creator: Uuid,
}
