//! Derived views over the held task collection.
//!
//! Every function here is pure and recomputed on each call.

use crate::types::{SortKey, StatusFilter, Task, TaskStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;

pub const NO_DATE: &str = "No Date";

/// User-chosen list criteria. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub filter: StatusFilter,
    pub sort: SortKey,
}

/// Filter then sort, newest or highest priority first.
///
/// Tasks without a parseable date sort after all dated tasks. Ties keep
/// collection order.
pub fn project(tasks: &[Task], filter: StatusFilter, sort: SortKey) -> Vec<Task> {
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|t| filter.matches(t.status))
        .cloned()
        .collect();

    match sort {
        SortKey::Priority => out.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortKey::Date => out.sort_by(|a, b| compare_dates_desc(a, b)),
    }
    out
}

pub fn project_view(tasks: &[Task], view: ViewState) -> Vec<Task> {
    project(tasks, view.filter, view.sort)
}

fn compare_dates_desc(a: &Task, b: &Task) -> Ordering {
    let a = a.date_time.as_deref().and_then(parse_date_time);
    let b = b.date_time.as_deref().and_then(parse_date_time);
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse the ISO forms the backend and the create form produce.
///
/// Offsets are normalized to UTC; naive values are taken as-is.
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Display form of a task date, or `No Date`.
pub fn render_date(date_time: Option<&str>) -> String {
    match date_time.and_then(parse_date_time) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Manager dashboard: pending work and decided history, in collection order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub pending: Vec<Task>,
    pub history: Vec<Task>,
}

pub fn dashboard(tasks: &[Task]) -> Dashboard {
    let (pending, history): (Vec<Task>, Vec<Task>) = tasks
        .iter()
        .cloned()
        .partition(|t| t.status == TaskStatus::Pending);
    Dashboard { pending, history }
}
