/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Self-registration
/// - `POST /auth/jwt/login` - Form login, returns a bearer token
/// - `POST /auth/jwt/logout` - No-op for stateless tokens
/// - `POST /auth/forgot-password` - Starts a password reset
/// - `POST /auth/reset-password` - Completes a password reset
/// - `POST /auth/request-verify-token` - Starts email verification
/// - `POST /auth/verify` - Completes email verification
///
/// Error messages on 400 responses are stable codes clients can match on,
/// e.g. `LOGIN_BAD_CREDENTIALS`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiForm, ValidatedJson},
    schemas::{
        auth::{ForgotPasswordRequest, RequestVerifyRequest, ResetPasswordRequest, VerifyRequest},
        BearerResponse, LoginForm, UserCreate, UserRead,
    },
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use taskhub_shared::auth::{manager::UserManagerError, middleware::Principal};
use tracing::info;

/// Register a new user
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "email": "king.arthur@camelot.bt", "password": "guinevere" }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: `REGISTER_USER_ALREADY_EXISTS`
/// - `422 Unprocessable Entity`: invalid email or password
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    let user = state
        .users
        .create(body.into(), true)
        .await
        .map_err(|e| match e {
            UserManagerError::AlreadyExists => {
                ApiError::Conflict("REGISTER_USER_ALREADY_EXISTS".to_string())
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with form credentials
///
/// ```text
/// POST /auth/jwt/login
/// Content-Type: application/x-www-form-urlencoded
///
/// username=king.arthur@camelot.bt&password=guinevere
/// ```
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `LOGIN_BAD_CREDENTIALS` (unknown email, wrong
///   password or inactive account)
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ApiResult<Json<BearerResponse>> {
    let user = state.users.authenticate(&form.username, &form.password).await?;
    let token = state.users.issue_access_token(&user)?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(BearerResponse::new(token)))
}

/// Log out
///
/// Tokens are stateless, so there is nothing to revoke; the route exists so
/// clients can confirm their token is still accepted.
pub async fn logout(Extension(principal): Extension<Principal>) -> StatusCode {
    info!(user_id = %principal.id(), "User logged out");
    StatusCode::NO_CONTENT
}

/// Request a password reset token
///
/// Always `202 Accepted`, whether or not the address is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<StatusCode> {
    state.users.forgot_password(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Reset a password with a token from `forgot-password`
///
/// # Errors
///
/// - `400 Bad Request`: `RESET_PASSWORD_BAD_TOKEN`
/// - `422 Unprocessable Entity`: the new password fails the policy
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<StatusCode> {
    state.users.reset_password(&body.token, &body.password).await?;
    Ok(StatusCode::OK)
}

/// Request an email verification token
///
/// Always `202 Accepted`.
pub async fn request_verify_token(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RequestVerifyRequest>,
) -> ApiResult<StatusCode> {
    state.users.request_verify(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Verify an email address
///
/// # Errors
///
/// - `400 Bad Request`: `VERIFY_USER_BAD_TOKEN` or `VERIFY_USER_ALREADY_VERIFIED`
pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<VerifyRequest>,
) -> ApiResult<Json<UserRead>> {
    let user = state.users.verify(&body.token).await?;
    Ok(Json(user.into()))
}
