/// User endpoints
///
/// # Endpoints
///
/// - `GET   /users/me` - Own profile
/// - `PATCH /users/me` - Update own profile (privilege flags ignored)
/// - `POST  /users` - Create a user (admin)
/// - `GET   /users` - List all users (admin)
/// - `GET   /users/:id` - Fetch a user (admin)
/// - `PATCH /users/:id` - Update any field of a user (admin)
///
/// There is no delete route; accounts are deactivated with `is_active`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ValidatedJson},
    schemas::{UserCreate, UserRead, UserUpdate},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use taskhub_shared::auth::{
    authorization::require_admin, manager::UserManagerError, middleware::Principal,
};
use tracing::info;
use uuid::Uuid;

fn update_error(err: UserManagerError) -> ApiError {
    match err {
        UserManagerError::AlreadyExists => {
            ApiError::Conflict("UPDATE_USER_EMAIL_ALREADY_EXISTS".to_string())
        }
        other => other.into(),
    }
}

/// Current user's profile
pub async fn get_me(Extension(principal): Extension<Principal>) -> Json<UserRead> {
    Json(principal.user.into())
}

/// Update the current user
///
/// Email, password and name only; `is_active`, `is_superuser` and
/// `is_verified` are ignored.
///
/// # Errors
///
/// - `409 Conflict`: `UPDATE_USER_EMAIL_ALREADY_EXISTS`
/// - `422 Unprocessable Entity`: invalid email or password
pub async fn update_me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<UserUpdate>,
) -> ApiResult<Json<UserRead>> {
    let user = state
        .users
        .update(&principal.user, body.into(), true)
        .await
        .map_err(update_error)?;

    Ok(Json(user.into()))
}

/// Create a user with any flags
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `409 Conflict`: email already registered
pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    require_admin(&principal)?;

    let user = state.users.create(body.into(), false).await.map_err(|e| match e {
        UserManagerError::AlreadyExists => ApiError::Conflict("User already exists".to_string()),
        other => other.into(),
    })?;

    info!(user_id = %user.id, admin_id = %principal.id(), "User created by admin");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List every user, oldest first
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<UserRead>>> {
    require_admin(&principal)?;

    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserRead::from).collect()))
}

/// Fetch a user by id
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: no such user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserRead>> {
    require_admin(&principal)?;

    let user = state.users.get(id).await?;
    Ok(Json(user.into()))
}

/// Update any field of a user, privilege flags included
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: no such user
/// - `409 Conflict`: `UPDATE_USER_EMAIL_ALREADY_EXISTS`
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(body): ValidatedJson<UserUpdate>,
) -> ApiResult<Json<UserRead>> {
    require_admin(&principal)?;

    let user = state.users.get(id).await?;
    let user = state
        .users
        .update(&user, body.into(), false)
        .await
        .map_err(update_error)?;

    info!(user_id = %user.id, admin_id = %principal.id(), "User updated by admin");
    Ok(Json(user.into()))
}
