//! User repository for database operations

use super::{NewUser, StoreError, StoreResult, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use todo_api_shared::{TokenPurpose, TokenRecord, User};
use tracing::warn;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Token row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRow {
    pub purpose: String,
    pub token: String,
}

/// PostgreSQL-backed [`UserStore`]
///
/// The token list lives in `user_tokens`, one row per record, so appending
/// and removing are single-statement writes.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the token list of a user, oldest first
    async fn load_tokens(&self, user_id: Uuid) -> StoreResult<Vec<TokenRecord>> {
        let rows = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT purpose, token
            FROM user_tokens
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.purpose.parse::<TokenPurpose>() {
                Ok(purpose) => Some(TokenRecord {
                    purpose,
                    token: row.token,
                }),
                Err(_) => {
                    warn!(%user_id, purpose = %row.purpose, "Skipping token with unknown purpose");
                    None
                }
            })
            .collect())
    }

    async fn hydrate(&self, record: Option<UserRecord>) -> StoreResult<Option<User>> {
        let Some(record) = record else {
            return Ok(None);
        };
        let tokens = self.load_tokens(record.id).await?;

        Ok(Some(User {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            tokens,
            created_at: record.created_at,
        }))
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(new_user.id)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        })?;

        Ok(User {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            tokens: Vec::new(),
            created_at: record.created_at,
        })
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        self.hydrate(record).await
    }

    async fn find_by_token(
        &self,
        id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.created_at
            FROM users u
            WHERE u.id = $1
              AND EXISTS (
                  SELECT 1 FROM user_tokens t
                  WHERE t.user_id = u.id AND t.token = $2 AND t.purpose = $3
              )
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;

        self.hydrate(record).await
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn push_token(&self, user_id: Uuid, record: &TokenRecord) -> StoreResult<bool> {
        // INSERT ... SELECT so a deleted user yields zero rows instead of an FK error
        let result = sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, purpose, token)
            SELECT id, $2, $3 FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(record.purpose.as_str())
        .bind(&record.token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn pull_token(&self, user_id: Uuid, token: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = $1 AND token = $2
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool> {
        // user_tokens and todos cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
