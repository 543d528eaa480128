//! HTTP binding to the task backend.
//!
//! One method per backend route. Methods return the raw outcome; callers
//! decide how a failure is classified and whether local state changes.

use crate::error::ApiError;
use crate::types::{Registration, TaskDraft, TaskStatus, User};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Result of a readiness probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResponse {
    /// The gateway answered with a non-server-error status.
    Reachable(u16),
    /// The gateway answered, but a service behind it failed.
    ServerError(u16),
    /// Nothing answered.
    Unreachable,
}

impl ProbeResponse {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeResponse::Reachable(_))
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http.request(method, self.url(path)).bearer_auth(token)
    }

    /// Send a non-mutating `OPTIONS` request to the login route.
    pub async fn probe(&self) -> ProbeResponse {
        match self
            .http
            .request(Method::OPTIONS, self.url("/auth/login"))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_server_error() => {
                ProbeResponse::ServerError(resp.status().as_u16())
            }
            Ok(resp) => ProbeResponse::Reachable(resp.status().as_u16()),
            Err(err) => {
                debug!(error = %err, "probe request failed");
                ProbeResponse::Unreachable
            }
        }
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let body: LoginResponse = expect_ok(resp)?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("missing token".to_string()))
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(registration)
            .send()
            .await?;
        expect_ok(resp)?;
        Ok(())
    }

    /// Ask the identity service whether a token is still valid.
    pub async fn validate(&self, token: &str) -> Result<(), ApiError> {
        let path = format!("/auth/validate?token={}", urlencoding::encode(token));
        let resp = self.http.get(self.url(&path)).send().await?;
        expect_ok(resp)?;
        Ok(())
    }

    pub async fn list_users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        let resp = self.authed(Method::GET, "/auth/users", token).send().await?;
        expect_ok(resp)?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch raw task records. Field names vary between backend versions.
    pub async fn list_tasks(&self, token: &str) -> Result<Value, ApiError> {
        let resp = self.authed(Method::GET, "/tasks", token).send().await?;
        expect_ok(resp)?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<(), ApiError> {
        let resp = self
            .authed(Method::POST, "/tasks", token)
            .json(draft)
            .send()
            .await?;
        expect_ok(resp)?;
        Ok(())
    }

    /// `PUT /tasks/{id}/approve` for `Approved`, `/reject` for anything else.
    pub async fn change_status(
        &self,
        token: &str,
        id: &str,
        status: TaskStatus,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/tasks/{}/{}",
            urlencoding::encode(id),
            status_endpoint(status)
        );
        let resp = self.authed(Method::PUT, &path, token).send().await?;
        expect_ok(resp)?;
        Ok(())
    }
}

/// Route segment for a status change.
pub fn status_endpoint(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Approved => "approve",
        _ => "reject",
    }
}

fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status: StatusCode = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        debug!(status = status.as_u16(), url = %resp.url(), "backend rejected request");
        Err(ApiError::Status(status.as_u16()))
    }
}
