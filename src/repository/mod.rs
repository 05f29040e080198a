//! Persistence contracts for users and tasks.
//!
//! Services depend only on the [`UserRepository`] and [`TaskRepository`]
//! traits. [`postgres`] backs them with sqlx, [`memory`] with in-process maps.
//! Every task operation takes the owner's id and filters on it, so a task
//! belonging to someone else is indistinguishable from a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskQuery, TaskUpdate, UserProfile, UserRecord};

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write (e.g. a duplicate email).
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Loads the full record, password hash included.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>>;

    /// Loads the credential-free projection of a user.
    async fn find_profile_by_id(&self, id: i32) -> RepositoryResult<Option<UserProfile>>;

    /// Inserts a user. Fails with [`RepositoryError::UniqueViolation`] when the
    /// email is taken.
    async fn create(&self, user: NewUser) -> RepositoryResult<UserRecord>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: Task) -> RepositoryResult<Task>;

    async fn find_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<Option<Task>>;

    /// Newest first.
    async fn list_for_owner(&self, user_id: i32, query: &TaskQuery) -> RepositoryResult<Vec<Task>>;

    async fn update_for_owner(
        &self,
        id: Uuid,
        user_id: i32,
        changes: TaskUpdate,
    ) -> RepositoryResult<Option<Task>>;

    /// Returns `false` when nothing owned by `user_id` had that id.
    async fn delete_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<bool>;
}
