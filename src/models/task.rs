use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Payload for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Required. Between 1 and 200 characters and not only whitespace.
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    /// Defaults to `medium` when omitted.
    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a task. Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

/// Query parameters for filtering the caller's task list.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring match against title or description.
    pub search: Option<String>,
}

impl Task {
    /// Builds a new task owned by `user_id`, with a fresh UUID and both
    /// timestamps set to now.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            completed: input.completed,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Applies the present fields of `changes` and bumps `updated_at`.
    pub fn apply(&mut self, changes: TaskUpdate) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now();
    }
}

impl TaskQuery {
    /// Whether `task` passes every filter that is set.
    pub fn matches(&self, task: &Task) -> bool {
        if self.completed.is_some_and(|completed| task.completed != completed) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        match self.search.as_deref() {
            Some(term) => {
                let term = term.to_lowercase();
                task.title.to_lowercase().contains(&term)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}
