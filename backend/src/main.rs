//! Todo API Backend
//!
//! Multi-user todo service with token-based sessions.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and the authentication gate
//! - Services: User directory and todo business logic
//! - Repositories: PostgreSQL or in-memory storage behind store traits
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use secrecy::ExposeSecret;
use todo_api_backend::{
    config::{self, StorageBackend},
    db, routes,
    state::AppState,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        storage = ?config.storage.backend,
        "Starting Todo API"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let backend = config.storage.backend;
    let state = match backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let db_pool = db::create_pool(&config.database).await?;

            // Production runs migrations as a separate job
            if !config::AppConfig::is_production() {
                info!("Running database migrations...");
                db::run_migrations(&db_pool).await?;
            }

            AppState::with_postgres(db_pool, config)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            AppState::in_memory(config)
        }
    };

    let addr = format!("{}:{}", state.config().server.host, state.config().server.port);
    let app = routes::create_router(state);

    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "todo_api_backend=info,tower_http=info".into()
        } else {
            "todo_api_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to start production with a guessable token secret
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    let secret = config.auth.token_secret.expose_secret();
    if secret.contains("development") || secret.len() < 32 {
        errors.push("Token secret must be at least 32 characters and not contain 'development'");
    }

    if config.storage.backend == StorageBackend::Memory {
        warn!("In-memory storage selected in production - data will not survive restarts");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
