//! Wiring of the client components around one shared session.

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{ApiError, LoginError};
use crate::probe::ReadinessProbe;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};
use crate::types::{Registration, Session};
use crate::workflow::TaskWorkflow;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A running client: one session, one held task collection.
pub struct TaskClient {
    api: ApiClient,
    session: Arc<SessionStore>,
    workflow: TaskWorkflow,
    retry_delay: Duration,
}

impl TaskClient {
    /// Build a client from configuration, loading any persisted session.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api = ApiClient::new(
            &config.api.base_url,
            Duration::from_millis(config.api.timeout_ms),
        )?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.session_path()));
        Ok(Self::new(api, storage).with_retry_delay(Duration::from_millis(config.probe.retry_delay_ms)))
    }

    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionStore::load(storage));
        let workflow = TaskWorkflow::new(api.clone(), Arc::clone(&session));
        Self {
            api,
            session,
            workflow,
            retry_delay: crate::probe::DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn workflow(&self) -> &TaskWorkflow {
        &self.workflow
    }

    /// A probe bound to this client's session.
    pub fn readiness_probe(&self) -> ReadinessProbe {
        ReadinessProbe::new(self.api.clone(), Arc::clone(&self.session))
            .with_retry_delay(self.retry_delay)
    }

    /// Authenticate, persist the session, then load tasks and users.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, LoginError> {
        let token = self.api.login(username, password).await?;
        let session = self.session.login_with_token(&token)?;
        info!(username, role = %session.role, "logged in");
        self.workflow.refresh().await;
        Ok(session)
    }

    /// Load tasks and users for a session restored from storage.
    pub async fn resume(&self) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }
        self.workflow.refresh().await;
        true
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.api.register(registration).await?;
        info!(username = %registration.username, "account registered");
        Ok(())
    }

    /// Ask the identity service whether the held token is still accepted.
    pub async fn validate_session(&self) -> Result<bool, ApiError> {
        let Some(token) = self.session.token() else {
            return Ok(false);
        };
        match self.api.validate(&token).await {
            Ok(()) => Ok(true),
            Err(ApiError::Status(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Clear the session, persisted client state and held data.
    pub fn logout(&self) -> Result<(), crate::error::StorageError> {
        self.workflow.clear();
        self.session.logout()
    }
}
