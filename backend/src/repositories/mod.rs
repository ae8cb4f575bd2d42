//! Data access layer
//!
//! Services talk to storage through the [`UserStore`] and [`TodoStore`]
//! traits. `UserRepository`/`TodoRepository` back them with PostgreSQL,
//! [`MemoryStore`] with process-local maps.
//!
//! Token-list mutations (`push_token`/`pull_token`) must be atomic per user:
//! two concurrent logins against the same user both land.

use async_trait::async_trait;
use thiserror::Error;
use todo_api_shared::{Todo, TokenPurpose, TokenRecord, User};
use uuid::Uuid;

pub mod memory;
pub mod todo;
pub mod user;

pub use memory::MemoryStore;
pub use todo::TodoRepository;
pub use user::UserRepository;

/// Storage-layer failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique email index rejected the write
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Input for creating a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Field values written by a todo update
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub text: Option<String>,
    pub completed: bool,
    pub completed_at: Option<i64>,
}

/// Persistence of user records and their token lists
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user with an empty token list
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// User `id`, only if it currently holds `token` with `purpose`
    async fn find_by_token(
        &self,
        id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> StoreResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// Atomically append a token record. `false` if the user is gone.
    async fn push_token(&self, user_id: Uuid, record: &TokenRecord) -> StoreResult<bool>;

    /// Atomically remove a token record. `false` if nothing matched.
    async fn pull_token(&self, user_id: Uuid, token: &str) -> StoreResult<bool>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<bool>;

    /// Remove the user together with its tokens and todos
    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool>;

    /// Cheap liveness probe for readiness checks
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence of todos. Every lookup is scoped to the owning user.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_todo(&self, todo: &Todo) -> StoreResult<()>;

    async fn list_todos(&self, creator: Uuid) -> StoreResult<Vec<Todo>>;

    async fn find_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>>;

    async fn update_todo(&self, id: Uuid, creator: Uuid, changes: TodoChanges) -> StoreResult<Option<Todo>>;

    /// Remove and return the todo
    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>>;
}
