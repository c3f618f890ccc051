//! Generic CRUD execution against PostgreSQL.

use crate::catalog::ResourceDef;
use crate::error::AppError;
use crate::sql::{delete, insert, select_by_id, select_list, select_search, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// List rows with optional exact-match filters, limit (default 100, max 1000), offset (default 0).
    pub async fn list(
        pool: &PgPool,
        resource: &ResourceDef,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        const DEFAULT_LIMIT: u32 = 100;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(1000);
        let offset = offset.unwrap_or(0);
        let q = select_list(resource, filters, Some(limit), Some(offset));
        Self::query_many(pool, &q).await
    }

    /// Case-insensitive substring search across the resource's search columns.
    pub async fn search(
        pool: &PgPool,
        resource: &ResourceDef,
        query: &str,
    ) -> Result<Vec<Value>, AppError> {
        let q = select_search(resource, query);
        Self::query_many(pool, &q).await
    }

    /// Fetch one row by primary key. Returns JSON object or None.
    pub async fn read(
        pool: &PgPool,
        resource: &ResourceDef,
        id: &Value,
    ) -> Result<Option<Value>, AppError> {
        let mut q = select_by_id(resource);
        q.params.push(id.clone());
        Self::query_optional(pool, &q).await
    }

    /// Insert one row from the catalog-filtered body. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        resource: &ResourceDef,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = insert(resource, body);
        let row = Self::query_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        Ok(row)
    }

    /// Update one row by id. Returns the updated row or None when absent.
    pub async fn update(
        pool: &PgPool,
        resource: &ResourceDef,
        id: &Value,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = crate::sql::update(resource, id, body);
        Self::query_optional(pool, &q).await
    }

    /// Delete one row by id. Returns true when a row was removed.
    pub async fn delete(
        pool: &PgPool,
        resource: &ResourceDef,
        id: &Value,
    ) -> Result<bool, AppError> {
        let mut q = delete(resource);
        q.params.push(id.clone());
        let row = Self::query_optional(pool, &q).await?;
        Ok(row.is_some())
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

pub fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(v)) = row.try_get::<Option<Vec<String>>, _>(name) {
        return Value::Array(v.into_iter().map(Value::String).collect());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
