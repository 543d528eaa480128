//! `taskflow tasks` subcommands.

use crate::types::{Priority, SortKey, StatusFilter, TaskDraft};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// List tasks, filtered and sorted
    List(ListArgs),

    /// Create a task
    Create(CreateArgs),

    /// Approve a pending task (managers only)
    Approve { id: String },

    /// Reject a pending task (managers only)
    Reject { id: String },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// ALL, PENDING, APPROVED or REJECTED
    #[arg(short, long, value_parser = parse_filter)]
    pub status: Option<StatusFilter>,

    /// date or priority
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortKey>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Date and time, e.g. 2026-03-01T09:30
    #[arg(long = "date")]
    pub date_time: String,

    /// Low, Medium or High
    #[arg(short, long, default_value = "Medium", value_parser = parse_priority)]
    pub priority: Priority,

    /// Username of the assignee
    #[arg(short, long)]
    pub assignee: String,
}

impl From<CreateArgs> for TaskDraft {
    fn from(args: CreateArgs) -> Self {
        TaskDraft {
            title: args.title,
            description: args.description,
            date_time: args.date_time,
            priority: args.priority,
            assigned_user: args.assignee,
        }
    }
}

fn parse_filter(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::from_str(s).ok_or_else(|| format!("unknown status filter: {s}"))
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    SortKey::from_str(s).ok_or_else(|| format!("unknown sort key: {s}"))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("unknown priority: {s}"))
}
