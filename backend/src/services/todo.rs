//! Todo service
//!
//! Every operation takes the owner id from the authenticated identity and
//! never touches another user's todos. A todo that exists but belongs to
//! someone else is reported exactly like a missing one.

use crate::error::ApiError;
use crate::repositories::{TodoChanges, TodoStore};
use chrono::Utc;
use std::sync::Arc;
use todo_api_shared::validation::normalize_todo_text;
use todo_api_shared::{Todo, UpdateTodoRequest};
use tracing::debug;
use uuid::Uuid;

/// Todo service for CRUD operations
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Create a todo for `owner`
    pub async fn create(&self, owner: Uuid, text: &str) -> Result<Todo, ApiError> {
        let todo = Todo {
            id: Uuid::new_v4(),
            text: normalize_todo_text(text)?,
            completed: false,
            completed_at: None,
            creator: owner,
        };
        self.store.insert_todo(&todo).await?;

        debug!(todo_id = %todo.id, user_id = %owner, "Todo created");
        Ok(todo)
    }

    /// All todos of `owner`, oldest first
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Todo>, ApiError> {
        Ok(self.store.list_todos(owner).await?)
    }

    pub async fn get(&self, owner: Uuid, id: &str) -> Result<Todo, ApiError> {
        let id = parse_todo_id(id)?;
        self.store
            .find_todo(id, owner)
            .await?
            .ok_or_else(not_found)
    }

    /// Apply a partial update
    ///
    /// Only `text` and `completed` are honoured. Marking a todo completed
    /// stamps `completed_at`; anything else clears both fields.
    pub async fn update(&self, owner: Uuid, id: &str, req: UpdateTodoRequest) -> Result<Todo, ApiError> {
        let id = parse_todo_id(id)?;
        let text = req.text.as_deref().map(normalize_todo_text).transpose()?;
        let changes = completion_changes(text, req.completed, Utc::now().timestamp_millis());

        self.store
            .update_todo(id, owner, changes)
            .await?
            .ok_or_else(not_found)
    }

    /// Delete and return the todo
    pub async fn delete(&self, owner: Uuid, id: &str) -> Result<Todo, ApiError> {
        let id = parse_todo_id(id)?;
        let todo = self
            .store
            .delete_todo(id, owner)
            .await?
            .ok_or_else(not_found)?;

        debug!(todo_id = %todo.id, user_id = %owner, "Todo deleted");
        Ok(todo)
    }
}

/// Malformed ids are indistinguishable from unknown ones
fn parse_todo_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn not_found() -> ApiError {
    ApiError::NotFound("Todo not found".to_string())
}

/// Field values for an update arriving at `now_ms`
pub fn completion_changes(text: Option<String>, completed: Option<bool>, now_ms: i64) -> TodoChanges {
    if completed == Some(true) {
        TodoChanges {
            text,
            completed: true,
            completed_at: Some(now_ms),
        }
    } else {
        TodoChanges {
            text,
            completed: false,
            completed_at: None,
        }
    }
}
