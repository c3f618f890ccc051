//! End-to-end router tests backed by the in-memory forum store.

use agroconnect::config::{AppConfig, Environment};
use agroconnect::forum::MemoryForumStore;
use agroconnect::{app_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        environment: Environment::Development,
        database_url: "postgres://localhost/agroconnect_test".into(),
        upload_dir: std::env::temp_dir()
            .join("agroconnect-test-uploads")
            .to_string_lossy()
            .into_owned(),
        max_upload_bytes: 1024 * 1024,
    };
    // Lazy pool: generic-resource routes would need a live database, the
    // forum routes under test never touch it.
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    let state = AppState::new(pool, Arc::new(MemoryForumStore::new()), config);
    app_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_as(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-User-Id", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_post(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/forum/posts",
            json!({"title": "Pest warning", "content": "Locusts spotted near the river"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_environment() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "development");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn reaction_toggles_and_flips_through_the_api() {
    let app = app();
    let post_id = create_post(&app).await;
    let uri = format!("/api/forum/posts/{}/likes", post_id);

    let response = app
        .clone()
        .oneshot(post_json(&uri, json!({"action": "like"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["likes"], 1);
    assert_eq!(body["data"]["reaction"], "like");

    let response = app
        .clone()
        .oneshot(post_json(&uri, json!({"action": "like"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["likes"], 0);
    assert_eq!(body["data"]["reaction"], Value::Null);

    let response = app
        .clone()
        .oneshot(post_json(&uri, json!({"action": "dislike"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["dislikes"], 1);

    let response = app
        .clone()
        .oneshot(post_json(&uri, json!({"action": "like"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["likes"], 1);
    assert_eq!(body["data"]["dislikes"], 0);
}

#[tokio::test]
async fn unknown_action_is_a_validation_error() {
    let app = app();
    let post_id = create_post(&app).await;
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/forum/posts/{}/likes", post_id),
            json!({"action": "love"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("action"));
}

#[tokio::test]
async fn reacting_to_an_unknown_post_is_404() {
    let response = app()
        .oneshot(post_json(
            "/api/forum/posts/00000000-0000-0000-0000-000000000000/likes",
            json!({"action": "like"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_without_title_is_rejected() {
    let response = app()
        .oneshot(post_json(
            "/api/forum/posts",
            json!({"content": "no title here"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn bookmark_toggles_membership_state() {
    let app = app();
    let post_id = create_post(&app).await;
    let uri = format!("/api/forum/posts/{}/bookmark", post_id);

    let response = app.clone().oneshot(post_json(&uri, json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["bookmarked"], true);

    let response = app.clone().oneshot(post_json(&uri, json!({}))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["bookmarked"], false);
}

#[tokio::test]
async fn fetching_a_post_counts_views() {
    let app = app();
    let post_id = create_post(&app).await;
    let uri = format!("/api/forum/posts/{}", post_id);

    app.clone().oneshot(get(&uri)).await.unwrap();
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["views"], 2);
}

#[tokio::test]
async fn only_the_author_can_delete_a_comment() {
    let app = app();
    let post_id = create_post(&app).await;

    let response = app
        .clone()
        .oneshot(post_json_as(
            &format!("/api/forum/posts/{}/comments", post_id),
            "farmer1",
            json!({"content": "Use neem spray"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let delete_uri = format!("/api/forum/posts/{}/comments/{}", post_id, comment_id);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&delete_uri)
                .header("X-User-Id", "farmer2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&delete_uri)
                .header("X-User-Id", "farmer1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn comment_likes_accumulate() {
    let app = app();
    let post_id = create_post(&app).await;
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/forum/posts/{}/comments", post_id),
            json!({"content": "helpful"}),
        ))
        .await
        .unwrap();
    let comment_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let like_uri = format!(
        "/api/forum/posts/{}/comments/{}/likes",
        post_id, comment_id
    );
    app.clone().oneshot(post_json(&like_uri, json!({}))).await.unwrap();
    let response = app.clone().oneshot(post_json(&like_uri, json!({}))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["likes"], 2);
}

#[tokio::test]
async fn report_and_join_whatsapp() {
    let app = app();
    let post_id = create_post(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/forum/posts/{}/report", post_id),
            json!({"reason": "misleading"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["reason"], "misleading");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/forum/posts/{}/join-whatsapp", post_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["whatsapp_group_joined"], true);
}

#[tokio::test]
async fn post_list_supports_category_filter_and_search() {
    let app = app();
    create_post(&app).await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/forum/posts",
            json!({
                "title": "Selling onions",
                "content": "Fresh stock",
                "category": "market",
                "tags": ["onion"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/forum/posts?category=market"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/forum/posts?q=locusts"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], 1);
}

#[tokio::test]
async fn unknown_resource_segment_is_404() {
    let response = app().oneshot(get("/api/unknown-things")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_without_query_is_400() {
    let response = app().oneshot(get("/api/schemes/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("q is required"));
}

#[tokio::test]
async fn delete_is_rejected_for_protected_resources() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/schemes/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_post_id_is_bad_request() {
    let response = app().oneshot(get("/api/forum/posts/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
