//! Forum handlers: posts, reactions, bookmarks, comments, reports.

use crate::error::AppError;
use crate::extractors::UserId;
use crate::forum::{NewPost, PostFilter, ReactionKind};
use crate::response;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

fn parse_post_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid post id".into()))
}

#[derive(Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub language: Option<String>,
    pub q: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = PostFilter {
        category: params.category.filter(|s| !s.is_empty()),
        language: params.language.filter(|s| !s.is_empty()),
        query: params.q.filter(|s| !s.is_empty()),
    };
    let posts = state.forum.list_posts(&filter).await?;
    Ok(response::ok_many(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    for field in ["title", "content"] {
        let present = body
            .get(field)
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }
    let new: NewPost = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let post = state.forum.create_post(user.as_str(), new).await?;
    Ok(response::created(post))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.forum.fetch_post(parse_post_id(&id_str)?).await?;
    Ok(response::ok(post))
}

pub async fn react(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    user: UserId,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&id_str)?;
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .and_then(ReactionKind::parse)
        .ok_or_else(|| AppError::Validation("action must be 'like' or 'dislike'".into()))?;
    let outcome = state.forum.apply_reaction(post_id, user.as_str(), action).await?;
    Ok(response::ok(outcome))
}

pub async fn bookmark(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    user: UserId,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&id_str)?;
    let bookmarked = state.forum.toggle_bookmark(post_id, user.as_str()).await?;
    Ok(response::ok(json!({ "bookmarked": bookmarked })))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let comments = state.forum.list_comments(parse_post_id(&id_str)?).await?;
    Ok(response::ok_many(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    user: UserId,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&id_str)?;
    let content = body
        .get("content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("content is required".into()))?;
    let comment = state
        .forum
        .create_comment(post_id, user.as_str(), content)
        .await?;
    Ok(response::created(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id_str, comment_id_str)): Path<(String, String)>,
    user: UserId,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id_str)?;
    let comment_id = Uuid::parse_str(&comment_id_str)
        .map_err(|_| AppError::BadRequest("invalid comment id".into()))?;
    state
        .forum
        .delete_comment(post_id, comment_id, user.as_str())
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn like_comment(
    State(state): State<AppState>,
    Path((post_id_str, comment_id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id_str)?;
    let comment_id = Uuid::parse_str(&comment_id_str)
        .map_err(|_| AppError::BadRequest("invalid comment id".into()))?;
    let comment = state.forum.like_comment(post_id, comment_id).await?;
    Ok(response::ok(comment))
}

pub async fn report_post(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    user: UserId,
    body: Option<Json<Value>>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&id_str)?;
    let reason = body
        .as_ref()
        .and_then(|Json(v)| v.get("reason"))
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let report = state.forum.report_post(post_id, user.as_str(), reason).await?;
    Ok(response::created(report))
}

pub async fn join_whatsapp(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.forum.join_whatsapp(parse_post_id(&id_str)?).await?;
    Ok(response::ok(post))
}
