//! In-memory storage backend
//!
//! Implements both store traits over a single write-locked map, which makes
//! every mutation atomic with respect to the others. Used when
//! `storage.backend = "memory"` and by the router tests.

use super::{NewUser, StoreError, StoreResult, TodoChanges, TodoStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use todo_api_shared::{Todo, TokenPurpose, TokenRecord, User};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Unique email index
    emails: HashMap<String, Uuid>,
    /// Insertion order doubles as list order
    todos: Vec<Todo>,
}

/// Process-local store; clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.emails.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: new_user.id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            tokens: Vec::new(),
            created_at: Utc::now(),
        };
        tables.emails.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_token(
        &self,
        id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .filter(|user| user.has_token(token, purpose))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.tables.read().await.emails.contains_key(email))
    }

    async fn push_token(&self, user_id: Uuid, record: &TokenRecord) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.tokens.push(record.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_token(&self, user_id: Uuid, token: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = user.tokens.len();
        user.tokens.retain(|record| record.token != token);
        Ok(user.tokens.len() != before)
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.remove(&user_id) else {
            return Ok(false);
        };
        tables.emails.remove(&user.email);
        tables.todos.retain(|todo| todo.creator != user_id);
        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, todo: &Todo) -> StoreResult<()> {
        self.tables.write().await.todos.push(todo.clone());
        Ok(())
    }

    async fn list_todos(&self, creator: Uuid) -> StoreResult<Vec<Todo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .filter(|todo| todo.creator == creator)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .find(|todo| todo.id == id && todo.creator == creator)
            .cloned())
    }

    async fn update_todo(&self, id: Uuid, creator: Uuid, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let mut tables = self.tables.write().await;
        let Some(todo) = tables
            .todos
            .iter_mut()
            .find(|todo| todo.id == id && todo.creator == creator)
        else {
            return Ok(None);
        };

        if let Some(text) = changes.text {
            todo.text = text;
        }
        todo.completed = changes.completed;
        todo.completed_at = changes.completed_at;
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let mut tables = self.tables.write().await;
        let position = tables
            .todos
            .iter()
            .position(|todo| todo.id == id && todo.creator == creator);
        Ok(position.map(|index| tables.todos.remove(index)))
    }
}
