//! Caller identity from the `X-User-Id` header.
//!
//! Authentication lives outside this service; an upstream gateway injects the
//! header. Requests without it act as the shared placeholder user.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Placeholder identity used when no header is present.
pub const DEFAULT_USER_ID: &str = "current_user";

#[derive(Clone, Debug)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER_ID);
        Ok(UserId(value.to_string()))
    }
}
