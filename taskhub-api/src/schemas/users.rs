/// User request and response bodies

use serde::{Deserialize, Serialize};
use taskhub_shared::auth::manager::{NewUser, UserChanges};
use taskhub_shared::models::user::User;
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /auth/register` and `POST /users`
///
/// Privilege flags are ignored on self-registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl From<UserCreate> for NewUser {
    fn from(body: UserCreate) -> Self {
        NewUser {
            email: body.email,
            password: body.password,
            name: body.name,
            is_active: body.is_active,
            is_superuser: body.is_superuser,
            is_verified: body.is_verified,
        }
    }
}

/// Body of `PATCH /users/me` and `PATCH /users/:id`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    /// Absent leaves the name alone; `null` clears it
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<Option<String>>,

    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl From<UserUpdate> for UserChanges {
    fn from(body: UserUpdate) -> Self {
        UserChanges {
            email: body.email,
            password: body.password,
            name: body.name,
            is_active: body.is_active,
            is_superuser: body.is_superuser,
            is_verified: body.is_verified,
        }
    }
}

/// User as returned by the API; never includes the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}
