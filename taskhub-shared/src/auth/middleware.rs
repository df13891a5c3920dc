/// Bearer authentication
///
/// Turns an `Authorization: Bearer <token>` header into a [`Principal`]: the
/// access token is validated, the user row is loaded, and unknown or
/// inactive users are rejected. The HTTP layer runs [`authenticate`] from a
/// middleware and inserts the principal into request extensions.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use sqlx::PgPool;
/// use taskhub_shared::auth::middleware::{authenticate, bearer_token};
///
/// # async fn example(pool: PgPool, headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
/// let token = bearer_token(&headers)?;
/// let principal = authenticate(&pool, "jwt-secret", token).await?;
/// println!("{} (admin: {})", principal.id(), principal.is_admin());
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError, TokenPurpose};
use crate::models::user::User;

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
}

impl Principal {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// Superusers get the task scope override and the admin routes
    pub fn is_admin(&self) -> bool {
        self.user.is_superuser
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token subject no longer exists
    #[error("Unknown user")]
    UnknownUser,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// Everything except a database failure is the caller's fault
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, AuthError::Database(_))
    }
}

/// Extracts the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Validates an access token and loads its active user
pub async fn authenticate(pool: &PgPool, secret: &str, token: &str) -> Result<Principal, AuthError> {
    let claims = validate_token(token, secret, TokenPurpose::Access).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidAudience { .. } => AuthError::InvalidToken("Wrong token type".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }

    Ok(Principal::new(user))
}
