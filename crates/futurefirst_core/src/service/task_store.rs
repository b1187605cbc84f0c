//! Progress-tracker tasks.
//!
//! # Invariants
//! - `completed_count` always equals the number of tasks with `done`.
//! - `updated_at` strictly increases on every mutation of a task.

use super::{persist, require_user, StoreError, StoreResult, UserScoped};
use crate::clock::next_timestamp;
use crate::model::task::{NewTask, Task, TaskId, TaskProgress, TaskUpdate};
use crate::model::user::UserId;
use crate::storage::keys::DataType;
use crate::storage::user_data::UserDataStore;
use uuid::Uuid;

const CONTAINER: &str = "tasks";

pub struct TaskStore {
    data: UserDataStore,
    user_id: Option<UserId>,
    tasks: Vec<Task>,
    completed_count: usize,
}

impl TaskStore {
    pub fn new(data: UserDataStore) -> Self {
        Self {
            data,
            user_id: None,
            tasks: Vec::new(),
            completed_count: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn progress(&self) -> TaskProgress {
        TaskProgress::from_counts(self.tasks.len(), self.completed_count)
    }

    /// Open tasks due before `now_ms`, earliest due first.
    pub fn overdue(&self, now_ms: i64) -> Vec<&Task> {
        let mut overdue: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.is_overdue(now_ms))
            .collect();
        overdue.sort_by_key(|task| task.due_date);
        overdue
    }

    pub fn add_task(&mut self, request: NewTask) -> StoreResult<Task> {
        let user_id = require_user(self.user_id.as_ref())?;
        let title = validate_title(&request.title)?;
        let now_ms = self.data.now_ms();
        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: request.description.trim().to_string(),
            due_date: request.due_date,
            done: false,
            priority: request.priority,
            created_at: now_ms,
            updated_at: now_ms,
        };
        self.tasks.push(task.clone());
        self.commit(&user_id);
        Ok(task)
    }

    pub fn update_task(&mut self, id: TaskId, update: TaskUpdate) -> StoreResult<Task> {
        let user_id = require_user(self.user_id.as_ref())?;
        let title = update.title.as_deref().map(validate_title).transpose()?;
        let now_ms = self.data.now_ms();
        let task = self.find_mut(id)?;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description.trim().to_string();
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(done) = update.done {
            task.done = done;
        }
        task.updated_at = next_timestamp(now_ms, task.updated_at);
        let updated = task.clone();
        self.commit(&user_id);
        Ok(updated)
    }

    /// Flips `done`; the completed count is re-derived in the same update.
    pub fn toggle_task(&mut self, id: TaskId) -> StoreResult<Task> {
        let user_id = require_user(self.user_id.as_ref())?;
        let now_ms = self.data.now_ms();
        let task = self.find_mut(id)?;
        task.done = !task.done;
        task.updated_at = next_timestamp(now_ms, task.updated_at);
        let updated = task.clone();
        self.commit(&user_id);
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<Task> {
        let user_id = require_user(self.user_id.as_ref())?;
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.tasks.remove(index);
        self.commit(&user_id);
        Ok(removed)
    }

    fn find_mut(&mut self, id: TaskId) -> StoreResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn recount(&mut self) {
        self.completed_count = self.tasks.iter().filter(|task| task.done).count();
    }

    fn commit(&mut self, user_id: &UserId) {
        self.recount();
        persist(&self.data, user_id, DataType::ProgressTasks, &self.tasks);
    }
}

fn validate_title(title: &str) -> StoreResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput("task title is blank"));
    }
    Ok(trimmed.to_string())
}

impl UserScoped for TaskStore {
    fn name(&self) -> &'static str {
        CONTAINER
    }

    fn set_current_user(&mut self, user_id: &UserId) -> bool {
        if self.user_id.as_ref() == Some(user_id) {
            return false;
        }
        self.tasks = self.data.load(user_id, DataType::ProgressTasks, Vec::new());
        self.user_id = Some(user_id.clone());
        self.recount();
        true
    }

    fn clear_user_data(&mut self) {
        self.tasks.clear();
        self.completed_count = 0;
        self.user_id = None;
    }

    fn current_user(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}
