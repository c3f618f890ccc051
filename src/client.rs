//! Typed HTTP client for the REST API, for CLI and service consumers.

use serde_json::Value;
use thiserror::Error;

/// Queries shorter than this never reach the network; `search` returns an
/// empty result set instead.
pub const MIN_SEARCH_QUERY_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
}

pub struct ResourceClient {
    base_url: String,
    http: reqwest::Client,
}

impl ResourceClient {
    /// `base_url` points at the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ResourceClient {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, resource: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, resource, id),
            None => format!("{}/{}", self.base_url, resource),
        }
    }

    async fn into_value(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if status.is_success() {
            if status == reqwest::StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            return Ok(response.json().await?);
        }
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| status.to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(self.url(resource, None))
            .query(query)
            .send()
            .await?;
        Self::into_value(response).await
    }

    pub async fn get(&self, resource: &str, id: &str) -> Result<Value, ClientError> {
        let response = self.http.get(self.url(resource, Some(id))).send().await?;
        Self::into_value(response).await
    }

    /// Substring search. Under the minimum query length no request is issued
    /// and the result is an empty collection envelope.
    pub async fn search(&self, resource: &str, query: &str) -> Result<Value, ClientError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Ok(serde_json::json!({ "data": [], "meta": { "count": 0 } }));
        }
        let response = self
            .http
            .get(format!("{}/search", self.url(resource, None)))
            .query(&[("q", query)])
            .send()
            .await?;
        Self::into_value(response).await
    }

    pub async fn create(&self, resource: &str, body: &Value) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(self.url(resource, None))
            .json(body)
            .send()
            .await?;
        Self::into_value(response).await
    }

    pub async fn update(
        &self,
        resource: &str,
        id: &str,
        body: &Value,
    ) -> Result<Value, ClientError> {
        let response = self
            .http
            .patch(self.url(resource, Some(id)))
            .json(body)
            .send()
            .await?;
        Self::into_value(response).await
    }

    pub async fn delete(&self, resource: &str, id: &str) -> Result<Value, ClientError> {
        let response = self.http.delete(self.url(resource, Some(id))).send().await?;
        Self::into_value(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_doubled_slashes() {
        let c = ResourceClient::new("http://localhost:5000/api/");
        assert_eq!(c.url("schemes", None), "http://localhost:5000/api/schemes");
        assert_eq!(
            c.url("schemes", Some("abc")),
            "http://localhost:5000/api/schemes/abc"
        );
    }

    #[tokio::test]
    async fn short_search_query_never_hits_the_network() {
        // The base URL is unreachable; a request would surface as Http error.
        let c = ResourceClient::new("http://127.0.0.1:9/api");
        let out = c.search("equipment", "ab").await.unwrap();
        assert_eq!(out["data"].as_array().map(Vec::len), Some(0));
        let out = c.search("equipment", "  a  ").await.unwrap();
        assert_eq!(out["meta"]["count"], 0);
    }
}
