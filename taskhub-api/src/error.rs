/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`; library errors convert through the
/// `From` impls below and render as:
///
/// ```json
/// { "error": "not_found", "message": "User not found" }
/// ```
///
/// Validation failures add a `details` array of `{ field, message }`.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<u32>> {
///     Err(ApiError::NotFound("Nothing here".to_string()))
/// }
/// ```

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskhub_shared::auth::{
    authorization::AuthzError,
    jwt::JwtError,
    manager::UserManagerError,
    middleware::AuthError,
    password::PasswordError,
};
use taskhub_shared::models::task::TaskError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400); the message is a stable error code where one exists
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unsupported media type (415)
    UnsupportedMediaType(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                msg,
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Logged, never sent to the client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some(constraint) if constraint.contains("email") => {
                        ApiError::Conflict("Email already exists".to_string())
                    }
                    Some(constraint) => {
                        ApiError::Conflict(format!("Constraint violation: {}", constraint))
                    }
                    None => ApiError::Conflict("Constraint violation".to_string()),
                }
            }
            sqlx::Error::Database(db_err) => {
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert bearer authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthorized() {
            ApiError::Unauthorized(err.to_string())
        } else {
            ApiError::InternalError(err.to_string())
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden => ApiError::Forbidden("Forbidden".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert task persistence errors to API errors
impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::OwnerNotFound(_) => ApiError::NotFound(err.to_string()),
            TaskError::Database(e) => e.into(),
        }
    }
}

/// Convert user manager errors to API errors
///
/// Routes that need a route-specific code (register, profile update) map
/// `AlreadyExists` themselves before falling back to this.
impl From<UserManagerError> for ApiError {
    fn from(err: UserManagerError) -> Self {
        match err {
            UserManagerError::AlreadyExists => {
                ApiError::Conflict("USER_ALREADY_EXISTS".to_string())
            }
            UserManagerError::InvalidPassword(reason) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("password", reason)])
            }
            UserManagerError::BadCredentials => {
                ApiError::BadRequest("LOGIN_BAD_CREDENTIALS".to_string())
            }
            UserManagerError::InvalidResetToken => {
                ApiError::BadRequest("RESET_PASSWORD_BAD_TOKEN".to_string())
            }
            UserManagerError::InvalidVerifyToken => {
                ApiError::BadRequest("VERIFY_USER_BAD_TOKEN".to_string())
            }
            UserManagerError::AlreadyVerified => {
                ApiError::BadRequest("VERIFY_USER_ALREADY_VERIFIED".to_string())
            }
            UserManagerError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            UserManagerError::Password(e) => e.into(),
            UserManagerError::Token(e) => e.into(),
            UserManagerError::Database(e) => e.into(),
            UserManagerError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert request validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    }
}

/// Convert JSON body rejections to API errors
///
/// Well-formed JSON of the wrong shape is a 422; anything that is not JSON
/// at all is a 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("body", e.body_text())])
            }
            JsonRejection::JsonSyntaxError(e) => ApiError::BadRequest(e.body_text()),
            JsonRejection::MissingJsonContentType(e) => {
                ApiError::UnsupportedMediaType(e.body_text())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert form body rejections to API errors
impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        match rejection {
            FormRejection::FailedToDeserializeForm(e) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("body", e.body_text())])
            }
            FormRejection::FailedToDeserializeFormBody(e) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("body", e.body_text())])
            }
            FormRejection::InvalidFormContentType(e) => {
                ApiError::UnsupportedMediaType(e.body_text())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert path parameter rejections to API errors
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("path", e.body_text())])
            }
            other => ApiError::InternalError(other.body_text()),
        }
    }
}
