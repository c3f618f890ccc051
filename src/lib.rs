//! AgroConnect: farmer-services REST backend.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod extractors;
pub mod forum;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod upload;

pub use catalog::{resource_by_path, ResourceDef, RESOURCES};
pub use client::{ClientError, ResourceClient};
pub use config::{AppConfig, Environment};
pub use error::AppError;
pub use forum::{ForumStore, MemoryForumStore, PgForumStore};
pub use routes::app_router;
pub use schema::{ensure_database_exists, ensure_tables};
pub use state::AppState;
