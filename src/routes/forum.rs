//! Forum routes.

use crate::handlers::forum::{
    bookmark, create_comment, create_post, delete_comment, get_post, join_whatsapp, like_comment,
    list_comments, list_posts, react, report_post,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn forum_routes(state: AppState) -> Router {
    Router::new()
        .route("/forum/posts", get(list_posts).post(create_post))
        .route("/forum/posts/:id", get(get_post))
        .route("/forum/posts/:id/likes", post(react))
        .route("/forum/posts/:id/bookmark", post(bookmark))
        .route(
            "/forum/posts/:id/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/forum/posts/:post_id/comments/:comment_id",
            delete(delete_comment),
        )
        .route(
            "/forum/posts/:post_id/comments/:comment_id/likes",
            post(like_comment),
        )
        .route("/forum/posts/:id/report", post(report_post))
        .route("/forum/posts/:id/join-whatsapp", post(join_whatsapp))
        .with_state(state)
}
