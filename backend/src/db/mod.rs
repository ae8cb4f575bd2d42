//! PostgreSQL pool management
//!
//! Pool creation with acquire/idle/lifetime limits and embedded migrations.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Pool tuning on top of [`DatabaseConfig`]
pub struct PoolLimits {
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            min_connections: 2,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    create_pool_with_limits(config, &PoolLimits::default()).await
}

/// Create a PostgreSQL connection pool with explicit limits
pub async fn create_pool_with_limits(config: &DatabaseConfig, limits: &PoolLimits) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)?.application_name("todo-api");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(limits.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(limits.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(limits.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(limits.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    info!(
        max = config.max_connections,
        min = limits.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Run the embedded migrations in `backend/migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
