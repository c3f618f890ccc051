//! Generic resource handlers: list, search, create, read, update, delete,
//! dispatched by path segment from the static catalog.

use crate::catalog::{resource_by_path, ResourceDef};
use crate::error::AppError;
use crate::response;
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn resolve(path_segment: &str) -> Result<&'static ResourceDef, AppError> {
    resource_by_path(path_segment).ok_or_else(|| AppError::NotFound(path_segment.to_string()))
}

fn parse_id(id_str: &str) -> Result<Value, AppError> {
    let u = uuid::Uuid::parse_str(id_str)
        .map_err(|_| AppError::BadRequest("invalid id".into()))?;
    Ok(Value::String(u.to_string()))
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list_inner(
    state: &AppState,
    resource: &ResourceDef,
    params: HashMap<String, String>,
) -> Result<impl IntoResponse, AppError> {
    let mut limit: Option<u32> = None;
    let mut offset: Option<u32> = None;
    let mut filters: Vec<(String, Value)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = v.parse().ok(),
            "offset" => offset = v.parse().ok(),
            _ => {
                if resource.has_column(&k) {
                    filters.push((k, Value::String(v)));
                }
            }
        }
    }
    let rows = CrudService::list(&state.pool, resource, &filters, limit, offset).await?;
    Ok(response::ok_many(rows))
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    list_inner(&state, resource, params).await
}

pub async fn search(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    let query = params
        .get("q")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("q is required".into()))?;
    if resource.search_columns.is_empty() {
        return Err(AppError::BadRequest(format!(
            "{} is not searchable",
            path_segment
        )));
    }
    let rows = CrudService::search(&state.pool, resource, query).await?;
    Ok(response::ok_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_create(resource, &body)?;
    let row = CrudService::create(&state.pool, resource, &body).await?;
    Ok(response::created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::read(&state.pool, resource, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str))?;
    Ok(response::ok(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let row = CrudService::update(&state.pool, resource, &id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str))?;
    Ok(response::ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment)?;
    if !resource.deletable {
        return Err(AppError::BadRequest(format!(
            "delete not allowed for {}",
            path_segment
        )));
    }
    let id = parse_id(&id_str)?;
    if !CrudService::delete(&state.pool, resource, &id).await? {
        return Err(AppError::NotFound(id_str));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}
