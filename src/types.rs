//! Core types for the task approval client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval status of a task.
///
/// `Approved` and `Rejected` are terminal from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Approved,
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Approved => "APPROVED",
            TaskStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(TaskStatus::Pending),
            "APPROVED" => Some(TaskStatus::Approved),
            "REJECTED" => Some(TaskStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse a priority label case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Sort rank: High=3, Medium=2, Low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical task record held by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// ISO-8601 timestamp with a `T` separator, or `None` when the upstream
    /// record carried no usable date.
    pub date_time: Option<String>,
    pub priority: Priority,
    pub assigned_user: String,
    pub status: TaskStatus,
}

/// Directory entry used to populate the assignee selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: serde_json::Value,
    pub username: String,
    pub role: String,
}

impl User {
    /// Label shown in the assignee selector.
    pub fn label(&self) -> String {
        format!("{} ({})", self.username, self.role)
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date_time: String,
    pub priority: Priority,
    pub assigned_user: String,
}

/// Input for registering a new account with the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Authenticated identity. An empty role means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: String,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

/// Status filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Some(StatusFilter::All),
            other => TaskStatus::parse(other).map(StatusFilter::from),
        }
    }

    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == TaskStatus::Pending,
            StatusFilter::Approved => status == TaskStatus::Approved,
            StatusFilter::Rejected => status == TaskStatus::Rejected,
        }
    }
}

impl From<TaskStatus> for StatusFilter {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => StatusFilter::Pending,
            TaskStatus::Approved => StatusFilter::Approved,
            TaskStatus::Rejected => StatusFilter::Rejected,
        }
    }
}

/// Sort key for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Priority,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Some(SortKey::Date),
            "priority" => Some(SortKey::Priority),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_undecided() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Approved.is_terminal());
        assert!(TaskStatus::Rejected.is_terminal());
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn status_filter_parses_all_and_statuses() {
        assert_eq!(StatusFilter::from_str("all"), Some(StatusFilter::All));
        assert_eq!(StatusFilter::from_str("Pending"), Some(StatusFilter::Pending));
        assert_eq!(StatusFilter::from_str("bogus"), None);
        assert!(StatusFilter::All.matches(TaskStatus::Rejected));
        assert!(!StatusFilter::Approved.matches(TaskStatus::Pending));
    }

    #[test]
    fn draft_serializes_in_camel_case() {
        let draft = TaskDraft {
            title: "Ship".to_string(),
            date_time: "2026-01-02T09:30".to_string(),
            assigned_user: "alice".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["dateTime"], "2026-01-02T09:30");
        assert_eq!(value["assignedUser"], "alice");
        assert_eq!(value["priority"], "Medium");
    }
}
