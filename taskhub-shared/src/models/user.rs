/// User model and database operations
///
/// Users are created through the user manager (`auth::manager`), which owns
/// password hashing and duplicate detection; this module is the row-level
/// persistence it calls into.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(320) NOT NULL UNIQUE,
///     hashed_password VARCHAR(1024) NOT NULL,
///     name VARCHAR(255),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     is_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser::new("user@example.com", "$argon2id$...")).await?;
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, hashed_password, name, is_active, is_superuser, \
                            is_verified, created_at, updated_at";

/// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address, unique and stored lowercase
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Optional display name
    pub name: Option<String>,

    /// Inactive users cannot log in or use tokens
    pub is_active: bool,

    /// Administrator flag; drives the task scope override
    pub is_superuser: bool,

    /// Set once the email verification flow completes
    pub is_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user row
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub hashed_password: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl CreateUser {
    /// Active, unprivileged, unverified user
    pub fn new(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            hashed_password: hashed_password.into(),
            name: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
        }
    }
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    /// `Some(None)` clears the name
    pub name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UpdateUser {
    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.name.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.is_verified.is_none()
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, hashed_password, name, is_active, is_superuser, is_verified) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.hashed_password)
            .bind(data.name)
            .bind(data.is_active)
            .bind(data.is_superuser)
            .bind(data.is_verified)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email
    ///
    /// The caller is expected to pass a lowercased address; see
    /// [`normalize_email`].
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update and bumps `updated_at`
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.hashed_password.is_some() {
            bind_count += 1;
            query.push_str(&format!(", hashed_password = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }
        if data.is_superuser.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_superuser = ${}", bind_count));
        }
        if data.is_verified.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_verified = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(hashed_password) = data.hashed_password {
            q = q.bind(hashed_password);
        }
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }
        if let Some(is_superuser) = data.is_superuser {
            q = q.bind(is_superuser);
        }
        if let Some(is_verified) = data.is_verified {
            q = q.bind(is_verified);
        }

        q.fetch_optional(pool).await
    }

    /// Replaces the password hash only if it still equals `current_hash`
    ///
    /// Returns `None` when the user is gone or the hash changed in between,
    /// so two writers racing on the same stale hash cannot both succeed.
    pub async fn replace_password(
        pool: &PgPool,
        id: Uuid,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET hashed_password = $3, updated_at = NOW() \
             WHERE id = $1 AND hashed_password = $2 RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(current_hash)
            .bind(new_hash)
            .fetch_optional(pool)
            .await
    }

    /// Lists every user, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC");

        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Deletes a user and, through the foreign key, all of their tasks
    ///
    /// Not exposed over HTTP.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
