//! API request and response types

use crate::models::Todo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration request
///
/// Missing fields deserialize as empty strings so they fail validation
/// (400) rather than body parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Serialized user, as returned by every user endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
}

// ============================================================================
// Todo Types
// ============================================================================

/// Create todo request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub text: String,
}

/// Partial todo update
///
/// Any other fields in the body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Single todo envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

/// Todo list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_ignores_unknown_fields() {
        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"completed": true, "creator": "someone-else"}"#).unwrap();
        assert_eq!(req.completed, Some(true));
        assert!(req.text.is_none());
    }

    #[test]
    fn test_missing_credentials_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_empty_update_request() {
        let req: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(req.completed.is_none());
        assert!(req.text.is_none());
    }
}
