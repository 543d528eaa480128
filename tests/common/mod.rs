//! In-process fake of the task backend for integration tests.
//!
//! Serves the gateway routes the client uses on an ephemeral port. Each
//! test gets its own server and shared state it can inspect or rig.

#![allow(dead_code)]

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskflow_client::TaskClient;
use taskflow_client::api::ApiClient;
use taskflow_client::storage::{KeyValueStore, MemoryStore};

pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct BackendState {
    /// Probe requests answered with 500 before the backend turns ready.
    pub probe_failures: AtomicU32,
    pub probe_hits: AtomicU32,
    /// Delay before each probe answer, in milliseconds.
    pub probe_delay_ms: AtomicU64,
    pub task_list_hits: AtomicU32,
    /// Query string of every task list request.
    pub task_list_queries: Mutex<Vec<Option<String>>>,
    pub create_hits: AtomicU32,
    /// Forced response for approve/reject, e.g. 403 or 404.
    pub status_override: Mutex<Option<u16>>,
    /// `(id, route segment)` per status change request.
    pub status_calls: Mutex<Vec<(String, String)>>,
    pub tasks: Mutex<Vec<Value>>,
    pub users: Mutex<Vec<Value>>,
    /// username -> role
    pub accounts: Mutex<HashMap<String, String>>,
    pub issued: Mutex<Vec<String>>,
}

impl BackendState {
    pub fn set_status_override(&self, status: Option<u16>) {
        *self.status_override.lock().unwrap() = status;
    }

    pub fn status_calls(&self) -> Vec<(String, String)> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn hits(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    /// Start a backend seeded with a manager, a user and three tasks.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        {
            let mut accounts = state.accounts.lock().unwrap();
            accounts.insert("maria".to_string(), "ROLE_MANAGER".to_string());
            accounts.insert("bob".to_string(), "USER".to_string());
        }
        *state.users.lock().unwrap() = vec![
            json!({ "id": 1, "username": "maria", "role": "MANAGER" }),
            json!({ "id": 2, "username": "bob", "role": "USER" }),
        ];
        *state.tasks.lock().unwrap() = seed_tasks();

        let app = Router::new()
            .route("/auth/login", post(login).options(probe))
            .route("/auth/register", post(register))
            .route("/auth/validate", get(validate))
            .route("/auth/users", get(users))
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/{id}/{action}", put(change_status))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> TaskClient {
        client_for(&self.url, Arc::new(MemoryStore::new()))
    }

    pub fn client_with_store(&self, storage: Arc<dyn KeyValueStore>) -> TaskClient {
        client_for(&self.url, storage)
    }
}

pub fn client_for(url: &str, storage: Arc<dyn KeyValueStore>) -> TaskClient {
    let api = ApiClient::new(url, Duration::from_secs(5)).unwrap();
    TaskClient::new(api, storage).with_retry_delay(Duration::from_millis(50))
}

/// Address nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Unsigned JWT-shaped token carrying `role` in its payload.
pub fn make_token(username: &str, role: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": username, "role": role }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{payload}.signature")
}

/// One record per historical date shape.
fn seed_tasks() -> Vec<Value> {
    vec![
        json!({
            "id": 1, "title": "Quarterly report", "description": "Draft numbers",
            "dateTime": "2026-03-01T09:30:00", "priority": "High",
            "assignedUser": "bob", "status": "PENDING"
        }),
        json!({
            "id": 2, "title": "Office move", "createdDate": "2026-02-10 14:00:00",
            "priority": "Low", "assignedUser": "bob", "status": "APPROVED"
        }),
        json!({
            "id": "3", "title": "Badge renewal", "dateTime": null,
            "assignedUser": "maria", "status": "PENDING"
        }),
    ]
}

async fn probe(State(state): State<Arc<BackendState>>) -> StatusCode {
    state.probe_hits.fetch_add(1, Ordering::SeqCst);
    let delay = state.probe_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let remaining = state.probe_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        state.probe_failures.store(remaining - 1, Ordering::SeqCst);
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let role = state.accounts.lock().unwrap().get(username).cloned();
    match role {
        Some(role) if password == PASSWORD => {
            let token = make_token(username, &role);
            state.issued.lock().unwrap().push(token.clone());
            Ok(Json(json!({ "token": token })))
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn register(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> StatusCode {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let role = body["role"].as_str().unwrap_or("USER").to_string();
    let mut accounts = state.accounts.lock().unwrap();
    if username.is_empty() || accounts.contains_key(&username) {
        return StatusCode::BAD_REQUEST;
    }
    accounts.insert(username, role);
    StatusCode::OK
}

async fn validate(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let token = params.get("token").cloned().unwrap_or_default();
    if state.issued.lock().unwrap().contains(&token) {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn users(State(state): State<Arc<BackendState>>) -> Json<Value> {
    Json(Value::Array(state.users.lock().unwrap().clone()))
}

async fn list_tasks(
    State(state): State<Arc<BackendState>>,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    state.task_list_hits.fetch_add(1, Ordering::SeqCst);
    state.task_list_queries.lock().unwrap().push(query);
    Json(Value::Array(state.tasks.lock().unwrap().clone()))
}

async fn create_task(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> StatusCode {
    state.create_hits.fetch_add(1, Ordering::SeqCst);
    let mut tasks = state.tasks.lock().unwrap();
    let id = tasks.len() + 1;
    tasks.push(json!({
        "id": id,
        "title": body["title"],
        "description": body["description"],
        "dateTime": body["dateTime"],
        "priority": body["priority"],
        "assignedUser": body["assignedUser"],
        "status": "PENDING",
    }));
    StatusCode::CREATED
}

async fn change_status(
    State(state): State<Arc<BackendState>>,
    Path((id, action)): Path<(String, String)>,
) -> StatusCode {
    state
        .status_calls
        .lock()
        .unwrap()
        .push((id.clone(), action.clone()));

    if let Some(code) = *state.status_override.lock().unwrap() {
        return StatusCode::from_u16(code).unwrap();
    }
    let status = match action.as_str() {
        "approve" => "APPROVED",
        "reject" => "REJECTED",
        _ => return StatusCode::NOT_FOUND,
    };
    let mut tasks = state.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| id_matches(t, &id)) else {
        return StatusCode::NOT_FOUND;
    };
    task["status"] = json!(status);
    StatusCode::OK
}

fn id_matches(task: &Value, id: &str) -> bool {
    match &task["id"] {
        Value::String(s) => s == id,
        other => other.to_string() == id,
    }
}
