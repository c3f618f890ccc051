//! Route tables and top-level router assembly.

mod common;
mod forum;
mod resource;

pub use common::common_routes;
pub use forum::forum_routes;
pub use resource::resource_routes;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// The full application: `/api/...` plus the statically served uploads dir.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(common_routes(state.clone()))
        .merge(forum_routes(state.clone()))
        .merge(resource_routes(state.clone()));
    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
