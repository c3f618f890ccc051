//! Generic resource routes built from the static catalog.
//!
//! Handlers receive the path segment and resolve the resource themselves.
//! `/equipment` gets its own POST so creation can accept multipart uploads;
//! every other verb on equipment flows through the generic routes.

use crate::handlers::{equipment, resource};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/equipment", get(equipment::list).post(equipment::create))
        .route("/:path_segment", get(resource::list).post(resource::create))
        .route("/:path_segment/search", get(resource::search))
        .route(
            "/:path_segment/:id",
            get(resource::read)
                .patch(resource::update)
                .delete(resource::delete),
        )
        .with_state(state)
}
