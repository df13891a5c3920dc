/// Task endpoints
///
/// # Endpoints
///
/// - `POST   /tasks` - Create a task
/// - `GET    /tasks` - List visible tasks
/// - `GET    /tasks/:id` - Fetch one task
/// - `PUT    /tasks/:id` - Partially update a task
/// - `DELETE /tasks/:id` - Delete a task, returning its last state
///
/// Regular users only ever see their own tasks; administrators see all of
/// them. A task outside the caller's scope is indistinguishable from a
/// missing one: the single-task routes answer `200` with a `null` body.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ValidatedJson},
    schemas::{TaskCreate, TaskRead, TaskUpdate},
};
use axum::{extract::State, Extension, Json};
use taskhub_shared::auth::{authorization::task_scope, middleware::Principal};

/// Create a task
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "name": "Write report", "description": "Q3 numbers", "status": "new" }
/// ```
///
/// Admins may add `"user_id"` to create the task for someone else; the field
/// is ignored for everyone else.
///
/// # Errors
///
/// - `404 Not Found`: the named owner does not exist
/// - `422 Unprocessable Entity`: missing fields or unknown status
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<TaskCreate>,
) -> ApiResult<Json<TaskRead>> {
    let task = state.tasks.create(&principal, body).await?;
    Ok(Json(task))
}

/// List tasks, ordered by id
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<TaskRead>>> {
    let tasks = state.tasks.list(task_scope(&principal)).await?;
    Ok(Json(tasks))
}

/// Fetch one task; `null` when absent or not visible
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Option<TaskRead>>> {
    let task = state.tasks.get(id, task_scope(&principal)).await?;
    Ok(Json(task))
}

/// Update the supplied fields of a task; `null` when absent or not visible
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(body): ValidatedJson<TaskUpdate>,
) -> ApiResult<Json<Option<TaskRead>>> {
    let task = state.tasks.update(id, body, task_scope(&principal)).await?;
    Ok(Json(task))
}

/// Delete a task; `null` when absent or not visible
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Option<TaskRead>>> {
    let task = state.tasks.delete(id, task_scope(&principal)).await?;
    Ok(Json(task))
}
