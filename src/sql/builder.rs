//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from catalog definitions.

use crate::catalog::ResourceDef;
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: id, catalog columns (numeric as ::text so sqlx returns String),
/// created_at, updated_at.
fn select_column_list(resource: &ResourceDef) -> String {
    let mut parts = vec![quoted("id")];
    for c in resource.columns {
        let q = quoted(c.name);
        if c.pg_type == "numeric" {
            parts.push(format!("{}::text AS {}", q, q));
        } else {
            parts.push(q);
        }
    }
    parts.push(quoted("created_at"));
    parts.push(quoted("updated_at"));
    parts.join(", ")
}

fn placeholder(resource: &ResourceDef, col: &str, param_num: usize) -> String {
    resource
        .column(col)
        .map(|c| format!("${}::{}", param_num, c.pg_type))
        .unwrap_or_else(|| format!("${}", param_num))
}

/// SELECT list with optional exact-match filters, ordered by creation time
/// descending, optional LIMIT/OFFSET. Filters not in the catalog are ignored.
pub fn select_list(
    resource: &ResourceDef,
    filters: &[(String, Value)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(resource.table);

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if resource.has_column(col) {
            let n = q.push_param(val.clone());
            where_parts.push(format!("{} = {}", quoted(col), placeholder(resource, col, n)));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = format!(" ORDER BY {} DESC", quoted(resource.order_by));
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n.min(1000))).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        select_column_list(resource),
        table,
        where_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    q
}

/// Case-insensitive substring search OR-combined across the resource's search
/// columns, ordered by creation time descending. One parameter: %query%.
pub fn select_search(resource: &ResourceDef, query: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(resource.table);
    let n = q.push_param(Value::String(format!("%{}%", query)));
    let matches: Vec<String> = resource
        .search_columns
        .iter()
        .map(|col| format!("{} ILIKE ${}", quoted(col), n))
        .collect();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} DESC",
        select_column_list(resource),
        table,
        matches.join(" OR "),
        quoted(resource.order_by)
    );
    q
}

/// SELECT by primary key. Caller binds id as the sole parameter.
pub fn select_by_id(resource: &ResourceDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(resource),
        quoted(resource.table),
        quoted("id")
    );
    q
}

/// INSERT: only catalog columns present in the body; RETURNING the full row.
pub fn insert(resource: &ResourceDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(resource.table);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in resource.columns {
        let Some(val) = body.get(c.name) else { continue };
        let n = q.push_param(val.clone());
        cols.push(quoted(c.name));
        placeholders.push(format!("${}::{}", n, c.pg_type));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(resource)
    );
    q
}

/// UPDATE by id: SET only catalog columns present in the body, always bumping
/// updated_at; RETURNING the full row. With no recognized columns, falls back
/// to a plain SELECT by id.
pub fn update(resource: &ResourceDef, id: &Value, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(resource.table);
    let mut sets = Vec::new();
    for c in resource.columns {
        let Some(val) = body.get(c.name) else { continue };
        let n = q.push_param(val.clone());
        sets.push(format!("{} = ${}::{}", quoted(c.name), n, c.pg_type));
    }
    if sets.is_empty() {
        q.params.push(id.clone());
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_column_list(resource),
            table,
            quoted("id")
        );
        return q;
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        sets.join(", "),
        quoted("id"),
        id_param,
        select_column_list(resource)
    );
    q
}

/// DELETE by id. Caller binds id as the sole parameter.
pub fn delete(resource: &ResourceDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        quoted(resource.table),
        quoted("id"),
        quoted("id")
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resource_by_path;
    use serde_json::json;

    #[test]
    fn list_orders_by_creation_time_descending() {
        let r = resource_by_path("schemes").unwrap();
        let q = select_list(r, &[], None, None);
        assert!(q.sql.contains("ORDER BY \"created_at\" DESC"), "{}", q.sql);
        assert!(q.params.is_empty());
    }

    #[test]
    fn list_filters_only_catalog_columns() {
        let r = resource_by_path("equipment").unwrap();
        let filters = vec![
            ("category".to_string(), json!("tractor")),
            ("nonsense; DROP TABLE".to_string(), json!("x")),
        ];
        let q = select_list(r, &filters, Some(10), Some(20));
        assert!(q.sql.contains("\"category\" = $1::text"), "{}", q.sql);
        assert!(!q.sql.contains("DROP TABLE"));
        assert!(q.sql.ends_with("LIMIT 10 OFFSET 20"), "{}", q.sql);
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn search_is_or_combined_ilike_with_one_param() {
        let r = resource_by_path("equipment").unwrap();
        let q = select_search(r, "plough");
        assert!(
            q.sql.contains("\"name\" ILIKE $1 OR \"description\" ILIKE $1 OR \"location\" ILIKE $1"),
            "{}",
            q.sql
        );
        assert_eq!(q.params, vec![json!("%plough%")]);
    }

    #[test]
    fn insert_skips_unknown_keys_and_returns_row() {
        let r = resource_by_path("expenses").unwrap();
        let body: HashMap<String, serde_json::Value> = [
            ("category".to_string(), json!("seeds")),
            ("amount".to_string(), json!(1200.50)),
            ("bogus".to_string(), json!("ignored")),
        ]
        .into_iter()
        .collect();
        let q = insert(r, &body);
        assert!(q.sql.starts_with("INSERT INTO \"expenses\""));
        assert!(q.sql.contains("RETURNING"));
        assert!(!q.sql.contains("bogus"));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_bumps_updated_at_and_binds_id_last() {
        let r = resource_by_path("bulk-deals").unwrap();
        let body: HashMap<String, serde_json::Value> =
            [("status".to_string(), json!("closed"))].into_iter().collect();
        let q = update(r, &json!("00000000-0000-0000-0000-000000000000"), &body);
        assert!(q.sql.contains("\"updated_at\" = NOW()"), "{}", q.sql);
        assert!(q.sql.contains("WHERE \"id\" = $2"), "{}", q.sql);
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_with_empty_body_degrades_to_select() {
        let r = resource_by_path("schemes").unwrap();
        let q = update(r, &json!("abc"), &HashMap::new());
        assert!(q.sql.starts_with("SELECT"), "{}", q.sql);
        assert_eq!(q.params.len(), 1);
    }
}
