//! Equipment creation with multipart image upload.

use crate::catalog::{EQUIPMENT, EQUIPMENT_PLACEHOLDER_IMAGE};
use crate::error::AppError;
use crate::response;
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use crate::upload::{self, StoredImage};
use axum::{
    extract::{Multipart, Query, State},
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::HashMap;

/// GET /api/equipment, same semantics as the generic list.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    super::resource::list_inner(&state, &EQUIPMENT, params).await
}

/// POST /api/equipment: multipart text fields plus an optional `image` part.
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut body: HashMap<String, Value> = HashMap::new();
    let mut stored: Option<StoredImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if bytes.is_empty() {
                continue;
            }
            stored = Some(upload::store_image(&state.config.upload_dir, &content_type, &bytes).await?);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            body.insert(name, Value::String(text));
        }
    }

    let image_url = stored
        .as_ref()
        .map(|s| s.url.clone())
        .unwrap_or_else(|| EQUIPMENT_PLACEHOLDER_IMAGE.to_string());
    body.insert("image_url".into(), Value::String(image_url));

    match insert_equipment(&state, &body).await {
        Ok(row) => Ok(response::created(row)),
        Err(err) => {
            if let Some(stored) = stored {
                upload::remove_stored(&stored.path).await;
            }
            Err(err)
        }
    }
}

async fn insert_equipment(
    state: &AppState,
    body: &HashMap<String, Value>,
) -> Result<Value, AppError> {
    RequestValidator::validate_create(&EQUIPMENT, body)?;
    CrudService::create(&state.pool, &EQUIPMENT, body).await
}
