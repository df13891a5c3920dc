/// Task manager
///
/// Thin service between the task routes and the task repository: decides
/// ownership on create, applies the configured owner policy, and converts
/// rows into `TaskRead`. Absent rows come back as `None`, not errors.

use sqlx::PgPool;
use taskhub_shared::auth::middleware::Principal;
use taskhub_shared::models::task::{OwnerPolicy, Task, TaskScope};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::schemas::{TaskCreate, TaskRead, TaskUpdate};

#[derive(Debug, Clone)]
pub struct TaskManager {
    pool: PgPool,
    owner_policy: OwnerPolicy,
}

/// Owner of a new task
///
/// Admins may create tasks for any user; everyone else always owns what
/// they create, whatever `requested` says.
pub fn resolve_owner(principal: &Principal, requested: Option<Uuid>) -> Uuid {
    match requested {
        Some(owner_id) if principal.is_admin() => owner_id,
        _ => principal.id(),
    }
}

impl TaskManager {
    pub fn new(pool: PgPool, owner_policy: OwnerPolicy) -> Self {
        Self { pool, owner_policy }
    }

    /// # Errors
    ///
    /// `404` when an admin names an owner that does not exist.
    pub async fn create(&self, principal: &Principal, body: TaskCreate) -> ApiResult<TaskRead> {
        let owner_id = resolve_owner(principal, body.user_id);

        let task = Task::create(&self.pool, owner_id, body.into_create_task(), self.owner_policy).await?;

        debug!(task_id = task.id, owner_id = %owner_id, caller = %principal.id(), "Created task");
        Ok(task.into())
    }

    pub async fn list(&self, scope: TaskScope) -> ApiResult<Vec<TaskRead>> {
        let tasks = Task::list(&self.pool, scope).await?;
        Ok(tasks.into_iter().map(TaskRead::from).collect())
    }

    pub async fn get(&self, id: i64, scope: TaskScope) -> ApiResult<Option<TaskRead>> {
        Ok(Task::find(&self.pool, id, scope).await?.map(TaskRead::from))
    }

    pub async fn update(
        &self,
        id: i64,
        body: TaskUpdate,
        scope: TaskScope,
    ) -> ApiResult<Option<TaskRead>> {
        Ok(Task::update(&self.pool, id, body.into(), scope)
            .await?
            .map(TaskRead::from))
    }

    pub async fn delete(&self, id: i64, scope: TaskScope) -> ApiResult<Option<TaskRead>> {
        Ok(Task::delete(&self.pool, id, scope).await?.map(TaskRead::from))
    }
}
