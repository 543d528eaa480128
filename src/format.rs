//! Output formatting for the CLI in markdown and JSON.

use crate::token;
use crate::types::{Session, Task, User};
use crate::view::{Dashboard, render_date};
use serde::{Deserialize, Serialize};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Task overview table.
pub fn format_tasks_markdown(tasks: &[Task]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Tasks ({})\n\n", tasks.len()));
    if tasks.is_empty() {
        md.push_str("_No tasks._\n");
        return md;
    }

    md.push_str("| ID | Title | Date | Assigned | Priority | Status |\n");
    md.push_str("|----|-------|------|----------|----------|--------|\n");
    for task in tasks {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            task.id,
            escape_cell(&task.title),
            render_date(task.date_time.as_deref()),
            escape_cell(&task.assigned_user),
            task.priority,
            task.status,
        ));
    }

    md
}

/// A single task with its description.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.title));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **status**: {}\n", task.status));
    md.push_str(&format!("- **priority**: {}\n", task.priority));
    md.push_str(&format!(
        "- **date**: {}\n",
        render_date(task.date_time.as_deref())
    ));
    md.push_str(&format!("- **assigned**: {}\n", task.assigned_user));

    if let Some(ref desc) = task.description
        && !desc.is_empty()
    {
        md.push_str("\n### Description\n");
        md.push_str(desc);
        md.push('\n');
    }

    md
}

/// Manager dashboard: pending tasks with their assignee, then decided history.
pub fn format_dashboard_markdown(board: &Dashboard) -> String {
    let mut md = String::new();

    md.push_str("# Manager Dashboard\n\n");

    md.push_str(&format!("## Pending Tasks ({})\n\n", board.pending.len()));
    for task in &board.pending {
        md.push_str(&format!(
            "- **{}** `{}` - User: {}\n",
            task.title, task.id, task.assigned_user
        ));
    }

    md.push_str(&format!("\n## History ({})\n\n", board.history.len()));
    for task in &board.history {
        md.push_str(&format!("- {} `{}` **{}**\n", task.title, task.id, task.status));
    }

    md
}

/// User directory as assignee options.
pub fn format_users_markdown(users: &[User]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Users ({})\n\n", users.len()));
    for user in users {
        md.push_str(&format!("- {}\n", user.label()));
    }

    md
}

pub fn format_session_markdown(session: &Session) -> String {
    if session.is_empty() {
        return "Not logged in.\n".to_string();
    }
    let role = if session.role.is_empty() {
        "unknown"
    } else {
        session.role.as_str()
    };
    let mut md = format!("Logged in. Role: **{}**\n", role);
    if token::is_manager_role(&session.role) {
        md.push_str("Manager dashboard available.\n");
    }
    md
}

/// Serialize any result for `--format json`.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
