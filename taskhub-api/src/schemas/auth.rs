/// Authentication request and response bodies

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login form (`application/x-www-form-urlencoded`)
///
/// `username` carries the email address.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Access token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerResponse {
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

impl BearerResponse {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestVerifyRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyRequest {
    pub token: String,
}

/// Response of `GET /authenticated-route`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedResponse {
    pub message: String,
    pub user_id: uuid::Uuid,
}
