//! Normalization of upstream task records.
//!
//! The task service has shipped several record shapes over time. The date
//! in particular may arrive as `dateTime`, `createdDate` or `created_date`,
//! with either a space or a `T` between date and time. Everything here is
//! total: any JSON value maps to a [`Task`].

use crate::types::{Priority, Task, TaskStatus};
use serde_json::Value;

/// Candidate date fields, highest priority first.
pub const DATE_FIELDS: [&str; 3] = ["dateTime", "createdDate", "created_date"];

/// Map one raw record to the canonical shape.
pub fn normalize(raw: &Value) -> Task {
    Task {
        id: raw.get("id").map(scalar_to_string).unwrap_or_default(),
        title: string_field(raw, "title").unwrap_or_default(),
        description: string_field(raw, "description"),
        date_time: normalize_date(raw),
        priority: string_field(raw, "priority")
            .and_then(|p| Priority::parse(&p))
            .unwrap_or_default(),
        assigned_user: string_field(raw, "assignedUser").unwrap_or_default(),
        status: string_field(raw, "status")
            .and_then(|s| TaskStatus::parse(&s))
            .unwrap_or(TaskStatus::Pending),
    }
}

/// Normalize a task list response. A non-array body yields an empty list.
pub fn normalize_all(raw: &Value) -> Vec<Task> {
    match raw.as_array() {
        Some(items) => items.iter().map(normalize).collect(),
        None => {
            tracing::warn!("task list response was not an array");
            Vec::new()
        }
    }
}

/// Resolve the timestamp from the first candidate field that carries a value.
///
/// Null, empty, `false` and `0` candidates are skipped in favour of the next
/// field. The first space is rewritten to `T`. Array-encoded dates
/// (`[2026, 1, 2, 9, 30]`) are rebuilt into ISO form.
pub fn normalize_date(raw: &Value) -> Option<String> {
    let value = DATE_FIELDS
        .iter()
        .filter_map(|field| raw.get(*field))
        .find(|v| has_value(v))?;

    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => date_from_parts(parts)?,
        other => other.to_string(),
    };
    Some(text.replacen(' ', "T", 1))
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Jackson without the JSR-310 string format emits `LocalDateTime` as
/// `[year, month, day, hour, minute, second?, nanos?]`.
fn date_from_parts(parts: &[Value]) -> Option<String> {
    let nums: Vec<i64> = parts.iter().map(Value::as_i64).collect::<Option<_>>()?;
    match nums.as_slice() {
        [y, mo, d] => Some(format!("{y:04}-{mo:02}-{d:02}T00:00:00")),
        [y, mo, d, h, mi] => Some(format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:00")),
        [y, mo, d, h, mi, s, ..] => Some(format!(
            "{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}"
        )),
        _ => None,
    }
}

fn string_field(raw: &Value, field: &str) -> Option<String> {
    match raw.get(field)? {
        Value::Null => None,
        value => Some(scalar_to_string(value)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
