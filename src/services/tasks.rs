use std::sync::Arc;

use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::{Task, TaskInput, TaskQuery, TaskUpdate};
use crate::repository::{RepositoryError, TaskRepository};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task with that id belongs to the caller.
    #[error("task not found")]
    NotFound,

    #[error("invalid task: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Owner-scoped task operations. Every call takes the authenticated user's id.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn create_task(&self, user_id: i32, input: TaskInput) -> Result<Task, TaskError> {
        input.validate()?;
        let task = self.tasks.create(Task::new(input, user_id)).await?;
        log::debug!("user {} created task {}", user_id, task.id);
        Ok(task)
    }

    pub async fn get_task(&self, user_id: i32, id: Uuid) -> Result<Task, TaskError> {
        self.tasks
            .find_for_owner(id, user_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_for_owner(user_id, query).await?)
    }

    pub async fn update_task(
        &self,
        user_id: i32,
        id: Uuid,
        changes: TaskUpdate,
    ) -> Result<Task, TaskError> {
        changes.validate()?;
        let task = self
            .tasks
            .update_for_owner(id, user_id, changes)
            .await?
            .ok_or(TaskError::NotFound)?;
        log::debug!("user {} updated task {}", user_id, id);
        Ok(task)
    }

    pub async fn delete_task(&self, user_id: i32, id: Uuid) -> Result<(), TaskError> {
        if !self.tasks.delete_for_owner(id, user_id).await? {
            return Err(TaskError::NotFound);
        }
        log::debug!("user {} deleted task {}", user_id, id);
        Ok(())
    }
}
