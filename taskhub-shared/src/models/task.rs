/// Task model and database operations
///
/// Every read and write is filtered through a [`TaskScope`]: ordinary users
/// see only their own rows, administrators see everything. The scope is a
/// single query parameter, so there is exactly one SQL statement per
/// operation regardless of who is asking.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('new', 'in_progress', 'completed');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'new',
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::{CreateTask, OwnerPolicy, Task, TaskScope, UpdateTask, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(
///     &pool,
///     owner,
///     CreateTask::new("Write report", "Quarterly numbers"),
///     OwnerPolicy::Verify,
/// )
/// .await?;
///
/// let scope = TaskScope::Owner(owner);
/// let patch = UpdateTask { status: Some(TaskStatus::InProgress), ..Default::default() };
/// Task::update(&pool, task.id, patch, scope).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, name, description, status, user_id";

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not started
    #[default]
    New,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status string
#[derive(Debug, thiserror::Error)]
#[error("Invalid status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(TaskStatus::New),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Which rows an operation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Only rows owned by this user
    Owner(Uuid),

    /// Every row (administrator override)
    All,
}

impl TaskScope {
    /// Scope for `owner_id`, widened to every row when `include_all` is set
    pub fn new(owner_id: Uuid, include_all: bool) -> Self {
        if include_all {
            TaskScope::All
        } else {
            TaskScope::Owner(owner_id)
        }
    }

    /// Owner filter bound into queries; `None` disables filtering
    pub fn owner_filter(&self) -> Option<Uuid> {
        match self {
            TaskScope::Owner(id) => Some(*id),
            TaskScope::All => None,
        }
    }
}

/// Whether `create` checks the owner row before inserting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// Look the owner up inside the insert transaction
    #[default]
    Verify,

    /// Insert directly and let the foreign key decide
    Trust,
}

/// Errors raised by task persistence
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The referenced owner does not exist
    #[error("User with id {0} does not exist")]
    OwnerNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Auto-assigned ID
    pub id: i64,

    pub name: String,

    pub description: String,

    pub status: TaskStatus,

    /// Owning user
    pub user_id: Uuid,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
}

impl CreateTask {
    /// New task with status `new`
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: TaskStatus::default(),
        }
    }
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

impl Task {
    /// Creates a task owned by `owner_id`
    ///
    /// Runs in a single transaction; the connection goes back to the pool
    /// (rolled back) if any step fails.
    ///
    /// # Errors
    ///
    /// `TaskError::OwnerNotFound` if the owner does not exist, whichever
    /// policy is in effect.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateTask,
        policy: OwnerPolicy,
    ) -> Result<Self, TaskError> {
        let mut tx = pool.begin().await?;

        if policy == OwnerPolicy::Verify {
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                    .bind(owner_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if !exists {
                return Err(TaskError::OwnerNotFound(owner_id));
            }
        }

        let query = format!(
            "INSERT INTO tasks (name, description, status, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.status)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    TaskError::OwnerNotFound(owner_id)
                }
                other => TaskError::Database(other),
            })?;

        tx.commit().await?;

        debug!(task_id = task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Lists tasks visible under `scope`, in insertion order
    pub async fn list(pool: &PgPool, scope: TaskScope) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY id ASC"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(scope.owner_filter())
            .fetch_all(pool)
            .await
    }

    /// Finds a task if it resolves under `scope`
    pub async fn find(
        pool: &PgPool,
        id: i64,
        scope: TaskScope,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(scope.owner_filter())
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update if the task resolves under `scope`
    ///
    /// Fields left as `None` keep their stored value. An empty patch is a
    /// plain lookup.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
        scope: TaskScope,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find(pool, id, scope).await;
        }

        let mut assignments = Vec::with_capacity(3);
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            assignments.push(format!("name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            assignments.push(format!("status = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} \
             WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2) \
             RETURNING {TASK_COLUMNS}",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(scope.owner_filter());

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a task if it resolves under `scope`
    ///
    /// Returns the row as it was just before deletion, or `None`.
    pub async fn delete(
        pool: &PgPool,
        id: i64,
        scope: TaskScope,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "DELETE FROM tasks \
             WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(scope.owner_filter())
            .fetch_optional(pool)
            .await?;

        if let Some(ref task) = task {
            debug!(task_id = task.id, "Task deleted");
        }

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_new() {
        assert_eq!(TaskStatus::default(), TaskStatus::New);
        assert_eq!(CreateTask::new("a", "b").status, TaskStatus::New);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
        assert!(serde_json::from_str::<TaskStatus>("\"bogus\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        for status in [TaskStatus::New, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }

        let err = "done".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: done");
    }

    #[test]
    fn test_scope_owner_filter() {
        let owner = Uuid::new_v4();

        assert_eq!(TaskScope::new(owner, false), TaskScope::Owner(owner));
        assert_eq!(TaskScope::new(owner, false).owner_filter(), Some(owner));

        assert_eq!(TaskScope::new(owner, true), TaskScope::All);
        assert_eq!(TaskScope::All.owner_filter(), None);
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_owner_policy_default_verifies() {
        assert_eq!(OwnerPolicy::default(), OwnerPolicy::Verify);
    }
}
