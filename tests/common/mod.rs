#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, request::Builder},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use doll_inventory::{
    auth::bootstrap::build_providers,
    config::AppConfig,
    db::connection,
    migration,
    routes::app,
    state::AppState,
    storage::PhotoStorage,
};

/// A migrated database and photo directory living in a temp dir for the
/// duration of one test.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("db").join("app.sqlite").display()
    );
    cfg.storage.photos_dir = dir.path().join("photos");
    cfg
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let cfg = test_config(&dir);

    migration::migrate(&cfg.database).await.expect("run migrations");
    let db = connection::connect(&cfg.database)
        .await
        .expect("connect to database");
    let providers = build_providers(&cfg.auth).expect("build auth providers");
    let storage = PhotoStorage::new(cfg.storage.photos_dir.clone());
    storage.ensure_root().await.expect("create photos dir");

    TestApp {
        state: AppState::new(cfg, db, providers, storage),
        dir,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Admin,
    Editor,
    Kid,
    Anonymous,
}

impl Role {
    pub fn apply(self, builder: Builder) -> Builder {
        let (user, groups) = match self {
            Role::Admin => ("alice", "family;dolls_admin"),
            Role::Editor => ("erin", "dolls_editor"),
            Role::Kid => ("kira", ""),
            Role::Anonymous => return builder,
        };
        builder
            .header("X-Forwarded-User", user)
            .header("X-Forwarded-Email", format!("{user}@example.com"))
            .header("X-Forwarded-Groups", groups)
    }
}

pub fn get(uri: &str, role: Role) -> Request<Body> {
    role.apply(Request::builder().method("GET").uri(uri))
        .body(Body::empty())
        .expect("build request")
}

pub fn delete(uri: &str, role: Role) -> Request<Body> {
    role.apply(Request::builder().method("DELETE").uri(uri))
        .body(Body::empty())
        .expect("build request")
}

pub fn post_empty(uri: &str, role: Role) -> Request<Body> {
    role.apply(Request::builder().method("POST").uri(uri))
        .body(Body::empty())
        .expect("build request")
}

pub fn send_json(method: &str, uri: &str, role: Role, body: Value) -> Request<Body> {
    role.apply(Request::builder().method(method).uri(uri))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub async fn send(state: &Arc<AppState>, request: Request<Body>) -> axum::response::Response {
    app(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible")
}

/// Status and decoded body; an empty body decodes to `Value::Null`.
pub async fn json_response(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = send(state, request).await;
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice(&bytes).expect("body is json");
    (status, json)
}

pub async fn create_container(state: &Arc<AppState>, name: &str) -> Value {
    let (status, body) = json_response(
        state,
        send_json(
            "POST",
            "/api/containers",
            Role::Admin,
            serde_json::json!({ "name": name }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

pub async fn create_doll(state: &Arc<AppState>, body: Value) -> Value {
    let (status, response) =
        json_response(state, send_json("POST", "/api/dolls", Role::Editor, body)).await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"].clone()
}

pub async fn doll_events(state: &Arc<AppState>, doll_id: i64) -> Vec<Value> {
    let (status, body) = json_response(
        state,
        get(&format!("/api/dolls/{doll_id}/events"), Role::Kid),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["items"]
        .as_array()
        .cloned()
        .expect("items array")
}

pub fn count_of(events: &[Value], event_type: &str) -> usize {
    events
        .iter()
        .filter(|event| event["event_type"] == event_type)
        .count()
}
