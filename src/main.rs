//! AgroConnect server binary.

use agroconnect::forum::{ForumStore, MemoryForumStore, PgForumStore};
use agroconnect::{app_router, ensure_database_exists, ensure_tables, AppConfig, AppState};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

async fn connect_database(config: &AppConfig) -> Result<PgPool, agroconnect::AppError> {
    ensure_database_exists(&config.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    ensure_tables(&pool).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    agroconnect::error::set_environment(config.environment);

    let (pool, forum): (PgPool, Arc<dyn ForumStore>) = match connect_database(&config).await {
        Ok(pool) => {
            tracing::info!("database ready");
            (pool.clone(), Arc::new(PgForumStore::new(pool)))
        }
        Err(err) => {
            tracing::warn!(error = %err, "database unavailable, forum runs in-memory");
            let lazy = PgPoolOptions::new().connect_lazy(&config.database_url)?;
            (lazy, Arc::new(MemoryForumStore::new()))
        }
    };

    let addr = config.bind_addr();
    let state = AppState::new(pool, forum, config);
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
