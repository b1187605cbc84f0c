//! Progress-tracker task entity owned by `TaskStore`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Optional due date, Unix epoch milliseconds.
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    pub created_at: i64,
    /// Strictly increases on every mutation.
    pub updated_at: i64,
}

impl Task {
    /// Overdue means not done and due strictly before `now_ms`.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.done && self.due_date.is_some_and(|due| due < now_ms)
    }
}

/// Input for `TaskStore::add_task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<i64>,
    pub priority: TaskPriority,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for `TaskStore::update_task`. `None` keeps the field;
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<i64>>,
    pub priority: Option<TaskPriority>,
    pub done: Option<bool>,
}

/// Aggregate shown by the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskProgress {
    pub total: usize,
    pub completed: usize,
    /// 0.0 when there are no tasks.
    pub percent: f64,
}

impl TaskProgress {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        Self {
            total,
            completed,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPriority, TaskProgress};
    use uuid::Uuid;

    fn task(done: bool, due_date: Option<i64>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Study".to_string(),
            description: String::new(),
            due_date,
            done,
            priority: TaskPriority::High,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn overdue_requires_open_task_past_due() {
        assert!(task(false, Some(10)).is_overdue(11));
        assert!(!task(true, Some(10)).is_overdue(11));
        assert!(!task(false, None).is_overdue(11));
        assert!(!task(false, Some(11)).is_overdue(11));
    }

    #[test]
    fn progress_percent_handles_empty() {
        assert_eq!(TaskProgress::from_counts(0, 0).percent, 0.0);
        assert_eq!(TaskProgress::from_counts(4, 1).percent, 25.0);
    }

    #[test]
    fn legacy_records_without_optional_fields_parse() {
        let raw = format!(
            r#"{{"id":"{}","title":"t","createdAt":1,"updatedAt":2}}"#,
            Uuid::new_v4()
        );
        let parsed: Task = serde_json::from_str(&raw).unwrap();
        assert!(!parsed.done);
        assert_eq!(parsed.priority, TaskPriority::Medium);
    }
}
