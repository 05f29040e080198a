//! In-process repositories.
//!
//! They honour the same contracts as the Postgres implementations (unique
//! emails, owner-scoped task access, newest-first listing) and are what the
//! test suites run against.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskQuery, TaskUpdate, UserProfile, UserRecord};

#[derive(Debug, Default)]
struct UserTable {
    last_id: i32,
    rows: Vec<UserRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_profile_by_id(&self, id: i32) -> RepositoryResult<Option<UserProfile>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|u| u.id == id)
            .map(|u| UserProfile::from(u.clone())))
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<UserRecord> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::UniqueViolation);
        }

        table.last_id += 1;
        let record = UserRecord {
            id: table.last_id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.push(record.clone());
        Ok(record)
    }
}

/// Tasks are kept in insertion order; listing walks them in reverse.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    rows: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: Task) -> RepositoryResult<Task> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|t| t.id == task.id) {
            return Err(RepositoryError::UniqueViolation);
        }
        rows.push(task.clone());
        Ok(task)
    }

    async fn find_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<Option<Task>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn list_for_owner(&self, user_id: i32, query: &TaskQuery) -> RepositoryResult<Vec<Task>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id && query.matches(t))
            .cloned()
            .collect())
    }

    async fn update_for_owner(
        &self,
        id: Uuid,
        user_id: i32,
        changes: TaskUpdate,
    ) -> RepositoryResult<Option<Task>> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|t| t.id == id && t.user_id == user_id) {
            Some(task) => {
                task.apply(changes);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(rows.len() != before)
    }
}
