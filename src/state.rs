//! Shared application state for all routes.

use crate::config::AppConfig;
use crate::forum::ForumStore;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Forum backend, chosen once at startup (Postgres, or in-memory when the
    /// datastore is unreachable).
    pub forum: Arc<dyn ForumStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, forum: Arc<dyn ForumStore>, config: AppConfig) -> Self {
        AppState {
            pool,
            forum,
            config: Arc::new(config),
        }
    }
}
