use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskQuery, TaskUpdate, UserProfile, UserRecord};

const TASK_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, created_at, updated_at, user_id";

fn map_insert_error(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return RepositoryError::UniqueViolation;
        }
    }
    RepositoryError::Database(error)
}

/// Wraps `term` for a literal substring match under `ILIKE ... ESCAPE '\'`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_profile_by_id(&self, id: i32) -> RepositoryResult<Option<UserProfile>> {
        // Projection only: password_hash never leaves the database here.
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, email, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
             RETURNING id, email, name, password_hash, created_at",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: Task) -> RepositoryResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, completed, priority, due_date, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.completed)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(created)
    }

    async fn find_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_for_owner(&self, user_id: i32, query: &TaskQuery) -> RepositoryResult<Vec<Task>> {
        // Filters are appended as numbered placeholders; binds below follow the
        // same order.
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
        let mut param = 2;

        if query.completed.is_some() {
            sql.push_str(&format!(" AND completed = ${param}"));
            param += 1;
        }
        if query.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${param}"));
            param += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${param} ESCAPE '\\' OR description ILIKE ${param} ESCAPE '\\')"
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut builder = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(completed) = query.completed {
            builder = builder.bind(completed);
        }
        if let Some(priority) = query.priority {
            builder = builder.bind(priority);
        }
        if let Some(search) = &query.search {
            builder = builder.bind(contains_pattern(search));
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    async fn update_for_owner(
        &self,
        id: Uuid,
        user_id: i32,
        changes: TaskUpdate,
    ) -> RepositoryResult<Option<Task>> {
        let sql = format!(
            "UPDATE tasks
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 completed = COALESCE($3, completed),
                 priority = COALESCE($4, priority),
                 due_date = COALESCE($5, due_date),
                 updated_at = NOW()
             WHERE id = $6 AND user_id = $7
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.completed)
            .bind(changes.priority)
            .bind(changes.due_date)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_for_owner(&self, id: Uuid, user_id: i32) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
