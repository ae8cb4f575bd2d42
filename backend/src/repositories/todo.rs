//! Todo repository for database operations

use super::{StoreResult, TodoChanges, TodoStore};
use async_trait::async_trait;
use sqlx::PgPool;
use todo_api_shared::Todo;
use uuid::Uuid;

/// Todo record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoRecord {
    pub id: Uuid,
    pub creator: Uuid,
    pub text: String,
    pub completed: bool,
    pub completed_at: Option<i64>,
}

impl From<TodoRecord> for Todo {
    fn from(record: TodoRecord) -> Self {
        Todo {
            id: record.id,
            text: record.text,
            completed: record.completed,
            completed_at: record.completed_at,
            creator: record.creator,
        }
    }
}

/// PostgreSQL-backed [`TodoStore`]
#[derive(Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for TodoRepository {
    async fn insert_todo(&self, todo: &Todo) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, creator, text, completed, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(todo.id)
        .bind(todo.creator)
        .bind(&todo.text)
        .bind(todo.completed)
        .bind(todo.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_todos(&self, creator: Uuid) -> StoreResult<Vec<Todo>> {
        let records = sqlx::query_as::<_, TodoRecord>(
            r#"
            SELECT id, creator, text, completed, completed_at
            FROM todos
            WHERE creator = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Todo::from).collect())
    }

    async fn find_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let record = sqlx::query_as::<_, TodoRecord>(
            r#"
            SELECT id, creator, text, completed, completed_at
            FROM todos
            WHERE id = $1 AND creator = $2
            "#,
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Todo::from))
    }

    async fn update_todo(&self, id: Uuid, creator: Uuid, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let record = sqlx::query_as::<_, TodoRecord>(
            r#"
            UPDATE todos SET
                text = COALESCE($3, text),
                completed = $4,
                completed_at = $5
            WHERE id = $1 AND creator = $2
            RETURNING id, creator, text, completed, completed_at
            "#,
        )
        .bind(id)
        .bind(creator)
        .bind(changes.text)
        .bind(changes.completed)
        .bind(changes.completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Todo::from))
    }

    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let record = sqlx::query_as::<_, TodoRecord>(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND creator = $2
            RETURNING id, creator, text, completed, completed_at
            "#,
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Todo::from))
    }
}
