//! Vault KV v2 Mock Server
//!
//! A lightweight Axum-based HTTP server that mimics the subset of the Vault API
//! used by `vault-keys`:
//!
//! - `GET  /v1/auth/token/lookup-self`
//! - `GET  /v1/{mount}/data/{path}`
//! - `POST /v1/{mount}/data/{path}`
//!
//! Secrets live in memory; every write is recorded so tests can count them.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "s.mock-root-token";

#[derive(Clone, Default)]
pub struct MockVault {
    secrets: Arc<Mutex<HashMap<String, (Value, u64)>>>,
    writes: Arc<Mutex<Vec<String>>>,
    reject: Arc<Mutex<Vec<String>>>,
    namespaces: Arc<Mutex<Vec<String>>>,
}

impl MockVault {
    /// Start the server on an ephemeral port and return its address
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/v1/auth/token/lookup-self", get(lookup_self))
            .route("/v1/{mount}/data/{*path}", get(read_secret).post(write_secret))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Pre-populate a secret (`key` is `mount/path`)
    pub fn insert(&self, key: &str, data: Value) {
        self.secrets
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, 1));
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.secrets.lock().unwrap().get(key).map(|(data, _)| data.clone())
    }

    /// Answer writes to `key` with 400
    pub fn reject(&self, key: &str) {
        self.reject.lock().unwrap().push(key.to_string());
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.lock().unwrap().clone()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        if let Some(namespace) = headers.get("x-vault-namespace").and_then(|v| v.to_str().ok()) {
            self.namespaces.lock().unwrap().push(namespace.to_string());
        }
        match headers.get("x-vault-token").and_then(|v| v.to_str().ok()) {
            Some(TOKEN) => Ok(()),
            _ => Err(vault_error(StatusCode::FORBIDDEN, "permission denied")),
        }
    }
}

fn vault_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "errors": [message] }))).into_response()
}

fn metadata(version: u64) -> Value {
    json!({
        "created_time": "2024-01-01T00:00:00.000000Z",
        "deletion_time": "",
        "destroyed": false,
        "version": version
    })
}

async fn lookup_self(State(vault): State<MockVault>, headers: HeaderMap) -> Response {
    if let Err(response) = vault.authorize(&headers) {
        return response;
    }
    Json(json!({ "data": { "display_name": "root", "policies": ["root"] } })).into_response()
}

async fn read_secret(
    State(vault): State<MockVault>,
    headers: HeaderMap,
    Path((mount, path)): Path<(String, String)>,
) -> Response {
    if let Err(response) = vault.authorize(&headers) {
        return response;
    }
    let key = format!("{mount}/{path}");
    match vault.secrets.lock().unwrap().get(&key) {
        Some((data, version)) => Json(json!({
            "data": { "data": data, "metadata": metadata(*version) }
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "errors": [] }))).into_response(),
    }
}

async fn write_secret(
    State(vault): State<MockVault>,
    headers: HeaderMap,
    Path((mount, path)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = vault.authorize(&headers) {
        return response;
    }
    let key = format!("{mount}/{path}");
    if vault.reject.lock().unwrap().contains(&key) {
        return vault_error(StatusCode::BAD_REQUEST, "invalid secret data");
    }
    let Some(data) = body.get("data").filter(|d| d.is_object()).cloned() else {
        return vault_error(StatusCode::BAD_REQUEST, "no data provided");
    };

    vault.writes.lock().unwrap().push(key.clone());
    let mut secrets = vault.secrets.lock().unwrap();
    let version = secrets.get(&key).map_or(1, |(_, v)| v + 1);
    secrets.insert(key, (data, version));

    Json(json!({ "data": metadata(version) })).into_response()
}
