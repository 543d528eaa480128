//! Task creation and the approve/reject workflow.
//!
//! The held collection is a replacement cache: it is swapped wholesale after
//! a fetch and after a create. Status changes are the one exception and
//! patch the matching task in place once the backend has acknowledged them.
//! Writes to the collection go through a single async lock so a mutation is
//! never applied before its request resolves.

use crate::api::ApiClient;
use crate::error::{ApiError, CreateError, StatusChangeError};
use crate::normalize;
use crate::session::SessionStore;
use crate::types::{Task, TaskDraft, TaskStatus, User};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct TaskWorkflow {
    api: ApiClient,
    session: Arc<SessionStore>,
    tasks: RwLock<Vec<Task>>,
    users: RwLock<Vec<User>>,
    /// Held for the full duration of any request that ends in a write.
    mutation: Mutex<()>,
}

impl TaskWorkflow {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            tasks: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            mutation: Mutex::new(()),
        }
    }

    /// Snapshot of the held task collection.
    pub fn tasks(&self) -> Vec<Task> {
        read(&self.tasks).clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        read(&self.tasks).iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of the user directory.
    pub fn users(&self) -> Vec<User> {
        read(&self.users).clone()
    }

    /// Labels for the assignee selector, in directory order.
    pub fn assignee_options(&self) -> Vec<(String, String)> {
        read(&self.users)
            .iter()
            .map(|u| (u.username.clone(), u.label()))
            .collect()
    }

    /// Replace tasks and users from the backend.
    ///
    /// Fetch failures are logged and leave the previous contents in place.
    pub async fn refresh(&self) {
        let Some(token) = self.session.token() else {
            debug!("refresh skipped: no session");
            return;
        };
        let _guard = self.mutation.lock().await;
        let (tasks, users) = tokio::join!(
            self.reload_tasks(&token),
            self.api.list_users(&token)
        );
        if let Err(err) = tasks {
            warn!(error = %err, "task fetch failed");
        }
        match users {
            Ok(users) => *write(&self.users) = users,
            Err(err) => warn!(error = %err, "user list fetch failed"),
        }
    }

    /// Replace the task collection from the backend. Failures are logged.
    pub async fn refresh_tasks(&self) {
        let Some(token) = self.session.token() else {
            return;
        };
        let _guard = self.mutation.lock().await;
        if let Err(err) = self.reload_tasks(&token).await {
            warn!(error = %err, "task fetch failed");
        }
    }

    /// Replace the user directory. Failures are logged.
    pub async fn refresh_users(&self) {
        let Some(token) = self.session.token() else {
            return;
        };
        match self.api.list_users(&token).await {
            Ok(users) => *write(&self.users) = users,
            Err(err) => warn!(error = %err, "user list fetch failed"),
        }
    }

    /// Caller must hold `mutation`.
    async fn reload_tasks(&self, token: &str) -> Result<usize, ApiError> {
        let raw = self.api.list_tasks(token).await?;
        let tasks = normalize::normalize_all(&raw);
        let count = tasks.len();
        *write(&self.tasks) = tasks;
        debug!(count, "task collection replaced");
        Ok(count)
    }

    /// Submit a new task, then re-fetch the whole collection.
    pub async fn create(&self, draft: &TaskDraft) -> Result<(), CreateError> {
        validate_draft(draft)?;
        let token = self.session.token().ok_or(CreateError::NotAuthenticated)?;

        let _guard = self.mutation.lock().await;
        self.api.create_task(&token, draft).await?;
        info!(title = %draft.title, assignee = %draft.assigned_user, "task created");

        if let Err(err) = self.reload_tasks(&token).await {
            warn!(error = %err, "task fetch after create failed");
        }
        Ok(())
    }

    /// Move a task to `status`, patching the held copy once acknowledged.
    ///
    /// Any status other than `Approved` goes to the reject route.
    pub async fn update_status(&self, id: &str, status: TaskStatus) -> Result<(), StatusChangeError> {
        let token = self
            .session
            .token()
            .ok_or(StatusChangeError::NotAuthenticated)?;

        let _guard = self.mutation.lock().await;
        if let Some(current) = self.task(id).map(|t| t.status)
            && current.is_terminal()
        {
            debug!(task_id = %id, %current, "task already decided, sending anyway");
        }
        if let Err(err) = self.api.change_status(&token, id, status).await {
            let err = StatusChangeError::from(err);
            warn!(task_id = %id, status = %status, kind = ?err.kind(), "status change refused");
            return Err(err);
        }

        let mut tasks = write(&self.tasks);
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => task.status = status,
            None => debug!(task_id = %id, "acknowledged task is not in the held collection"),
        }
        info!(task_id = %id, status = %status, "task status updated");
        Ok(())
    }

    pub async fn approve(&self, id: &str) -> Result<(), StatusChangeError> {
        self.update_status(id, TaskStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<(), StatusChangeError> {
        self.update_status(id, TaskStatus::Rejected).await
    }

    /// Drop everything held for the current session.
    pub fn clear(&self) {
        write(&self.tasks).clear();
        write(&self.users).clear();
    }
}

/// Title, date and assignee must be present before anything is sent.
pub fn validate_draft(draft: &TaskDraft) -> Result<(), CreateError> {
    if draft.title.trim().is_empty() {
        return Err(CreateError::MissingField("title"));
    }
    if draft.date_time.trim().is_empty() {
        return Err(CreateError::MissingField("dateTime"));
    }
    if draft.assigned_user.trim().is_empty() {
        return Err(CreateError::MissingField("assignedUser"));
    }
    Ok(())
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
