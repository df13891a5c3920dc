/// User manager
///
/// Account business logic on top of the user repository: registration,
/// credential checks, token issuance, password reset, email verification,
/// profile updates, and the startup superuser bootstrap.
///
/// Argon2 work runs on tokio's blocking pool so it never stalls the
/// executor.
///
/// # Safe vs unsafe operations
///
/// `create` and `update` take a `safe` flag. Safe calls (self-registration,
/// `/users/me`) ignore the privilege flags `is_active`, `is_superuser` and
/// `is_verified`; unsafe calls (admin routes) apply them.
///
/// # Example
///
/// ```no_run
/// use sqlx::PgPool;
/// use taskhub_shared::auth::manager::{NewUser, UserManager};
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let users = UserManager::new(pool, "jwt-secret-at-least-32-characters-long");
///
/// users.create(NewUser::new("king.arthur@camelot.bt", "guinevere"), true).await?;
/// let user = users.authenticate("king.arthur@camelot.bt", "guinevere").await?;
/// let token = users.issue_access_token(&user)?;
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::hooks::{LoggingHooks, UserHooks};
use super::jwt::{create_token, password_fingerprint, validate_token, Claims, JwtError, TokenPurpose};
use super::password::{hash_password, validate_password, verify_password, PasswordError};
use crate::models::user::{normalize_email, CreateUser, UpdateUser, User};

/// Errors raised by the user manager
#[derive(Debug, thiserror::Error)]
pub enum UserManagerError {
    #[error("User already exists")]
    AlreadyExists,

    /// Rejected by the password policy
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Invalid or expired verification token")]
    InvalidVerifyToken,

    #[error("User is already verified")]
    AlreadyVerified,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }
}

/// Requested profile changes; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    /// `Some(None)` clears the name
    pub name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

/// Account operations, cheap to clone
#[derive(Clone)]
pub struct UserManager {
    pool: PgPool,
    secret: Arc<str>,
    access_lifetime: Duration,
    hooks: Arc<dyn UserHooks>,
}

impl std::fmt::Debug for UserManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserManager")
            .field("access_lifetime", &self.access_lifetime)
            .finish_non_exhaustive()
    }
}

async fn hash_blocking(password: String) -> Result<String, UserManagerError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| UserManagerError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(UserManagerError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, UserManagerError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| UserManagerError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(UserManagerError::from)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl UserManager {
    /// Manager with the default access lifetime and [`LoggingHooks`]
    pub fn new(pool: PgPool, secret: impl Into<String>) -> Self {
        Self {
            pool,
            secret: Arc::from(secret.into()),
            access_lifetime: TokenPurpose::Access.default_lifetime(),
            hooks: Arc::new(LoggingHooks),
        }
    }

    pub fn with_access_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_lifetime = lifetime;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn UserHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Registers a user
    ///
    /// # Errors
    ///
    /// - `InvalidPassword` when the password policy rejects it
    /// - `AlreadyExists` when the email is taken
    pub async fn create(&self, new_user: NewUser, safe: bool) -> Result<User, UserManagerError> {
        let email = normalize_email(&new_user.email);
        validate_password(&new_user.password, &email).map_err(UserManagerError::InvalidPassword)?;

        if User::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(UserManagerError::AlreadyExists);
        }

        let hashed_password = hash_blocking(new_user.password).await?;

        let mut data = CreateUser::new(email, hashed_password);
        data.name = new_user.name;
        if !safe {
            data.is_active = new_user.is_active.unwrap_or(data.is_active);
            data.is_superuser = new_user.is_superuser.unwrap_or(data.is_superuser);
            data.is_verified = new_user.is_verified.unwrap_or(data.is_verified);
        }

        // Lost a race with a concurrent registration
        let user = User::create(&self.pool, data).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserManagerError::AlreadyExists
            } else {
                UserManagerError::Database(e)
            }
        })?;

        self.hooks.on_after_register(&user).await;
        Ok(user)
    }

    /// Checks credentials
    ///
    /// Unknown email, wrong password and inactive account all surface as
    /// `BadCredentials`. Unknown emails still pay for one hash so response
    /// time does not reveal which addresses are registered.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserManagerError> {
        let email = normalize_email(email);

        let Some(user) = User::find_by_email(&self.pool, &email).await? else {
            hash_blocking(password.to_string()).await?;
            return Err(UserManagerError::BadCredentials);
        };

        let valid = verify_blocking(password.to_string(), user.hashed_password.clone()).await?;
        if !valid || !user.is_active {
            return Err(UserManagerError::BadCredentials);
        }

        Ok(user)
    }

    /// Mints an access token for `user`
    pub fn issue_access_token(&self, user: &User) -> Result<String, UserManagerError> {
        let claims = Claims::with_expiration(user.id, TokenPurpose::Access, self.access_lifetime)?;
        Ok(create_token(&claims, &self.secret)?)
    }

    /// Starts the password reset flow
    ///
    /// Succeeds silently for unknown or inactive users.
    pub async fn forgot_password(&self, email: &str) -> Result<(), UserManagerError> {
        let email = normalize_email(email);

        let Some(user) = User::find_by_email(&self.pool, &email).await? else {
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        let claims = Claims::new(user.id, TokenPurpose::ResetPassword)?
            .with_password_fingerprint(password_fingerprint(&user.hashed_password));
        let token = create_token(&claims, &self.secret)?;

        self.hooks.on_after_forgot_password(&user, &token).await;
        Ok(())
    }

    /// Completes the password reset flow
    ///
    /// The token must be a live reset token for an active user whose
    /// password has not changed since it was issued.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<User, UserManagerError> {
        let claims = validate_token(token, &self.secret, TokenPurpose::ResetPassword)
            .map_err(|_| UserManagerError::InvalidResetToken)?;
        let fingerprint = claims
            .password_fgpt
            .ok_or(UserManagerError::InvalidResetToken)?;

        let user = User::find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(UserManagerError::InvalidResetToken)?;

        if fingerprint != password_fingerprint(&user.hashed_password) || !user.is_active {
            return Err(UserManagerError::InvalidResetToken);
        }

        validate_password(password, &user.email).map_err(UserManagerError::InvalidPassword)?;
        let hashed_password = hash_blocking(password.to_string()).await?;

        // Another reset with the same token may have landed while hashing
        let user = User::replace_password(&self.pool, user.id, &user.hashed_password, &hashed_password)
            .await?
            .ok_or(UserManagerError::InvalidResetToken)?;

        self.hooks.on_after_reset_password(&user).await;
        Ok(user)
    }

    /// Starts email verification
    ///
    /// Succeeds silently for unknown, inactive or already verified users.
    pub async fn request_verify(&self, email: &str) -> Result<(), UserManagerError> {
        let email = normalize_email(email);

        let Some(user) = User::find_by_email(&self.pool, &email).await? else {
            return Ok(());
        };
        if !user.is_active || user.is_verified {
            return Ok(());
        }

        let claims = Claims::new(user.id, TokenPurpose::Verify)?.with_email(user.email.clone());
        let token = create_token(&claims, &self.secret)?;

        self.hooks.on_after_request_verify(&user, &token).await;
        Ok(())
    }

    /// Completes email verification
    pub async fn verify(&self, token: &str) -> Result<User, UserManagerError> {
        let claims = validate_token(token, &self.secret, TokenPurpose::Verify)
            .map_err(|_| UserManagerError::InvalidVerifyToken)?;
        let email = claims.email.ok_or(UserManagerError::InvalidVerifyToken)?;

        let user = User::find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(UserManagerError::InvalidVerifyToken)?;

        // Address changed after the token was issued
        if user.email != email {
            return Err(UserManagerError::InvalidVerifyToken);
        }
        if user.is_verified {
            return Err(UserManagerError::AlreadyVerified);
        }

        let changes = UpdateUser {
            is_verified: Some(true),
            ..Default::default()
        };
        let user = User::update(&self.pool, user.id, changes)
            .await?
            .ok_or(UserManagerError::InvalidVerifyToken)?;

        self.hooks.on_after_verify(&user).await;
        Ok(user)
    }

    /// Updates a user's profile
    ///
    /// Changing the email resets `is_verified` (unless an unsafe call sets it
    /// explicitly). A new password goes through the policy and is re-hashed.
    pub async fn update(
        &self,
        user: &User,
        changes: UserChanges,
        safe: bool,
    ) -> Result<User, UserManagerError> {
        let mut update = UpdateUser {
            name: changes.name,
            ..Default::default()
        };

        let mut email = user.email.clone();
        if let Some(requested) = changes.email {
            let requested = normalize_email(&requested);
            if requested != user.email {
                if let Some(existing) = User::find_by_email(&self.pool, &requested).await? {
                    if existing.id != user.id {
                        return Err(UserManagerError::AlreadyExists);
                    }
                }
                email = requested.clone();
                update.email = Some(requested);
                update.is_verified = Some(false);
            }
        }

        if let Some(password) = changes.password {
            validate_password(&password, &email).map_err(UserManagerError::InvalidPassword)?;
            update.hashed_password = Some(hash_blocking(password).await?);
        }

        if !safe {
            update.is_active = changes.is_active;
            update.is_superuser = changes.is_superuser;
            if changes.is_verified.is_some() {
                update.is_verified = changes.is_verified;
            }
        }

        if update.is_empty() {
            return Ok(user.clone());
        }

        User::update(&self.pool, user.id, update)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserManagerError::AlreadyExists
                } else {
                    UserManagerError::Database(e)
                }
            })?
            .ok_or(UserManagerError::UserNotFound)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, UserManagerError> {
        User::find_by_id(&self.pool, id)
            .await?
            .ok_or(UserManagerError::UserNotFound)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserManagerError> {
        Ok(User::list(&self.pool).await?)
    }

    /// Makes sure a superuser with this email exists
    ///
    /// Creates the account (active, verified) when missing and promotes it
    /// when present but unprivileged. An existing password is left alone.
    pub async fn ensure_superuser(&self, email: &str, password: &str) -> Result<User, UserManagerError> {
        let normalized = normalize_email(email);

        if let Some(user) = User::find_by_email(&self.pool, &normalized).await? {
            if user.is_superuser && user.is_active {
                return Ok(user);
            }

            warn!(user_id = %user.id, "Promoting existing user to superuser");
            let changes = UserChanges {
                is_active: Some(true),
                is_superuser: Some(true),
                ..Default::default()
            };
            return self.update(&user, changes, false).await;
        }

        let new_user = NewUser {
            is_active: Some(true),
            is_superuser: Some(true),
            is_verified: Some(true),
            ..NewUser::new(normalized, password)
        };
        let user = self.create(new_user, false).await?;

        info!(user_id = %user.id, "Superuser created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn manager() -> UserManager {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/taskhub_unused")
            .expect("lazy pool");
        UserManager::new(pool, "test-secret-key-at-least-32-bytes-long")
    }

    #[tokio::test]
    async fn test_new_user_defaults() {
        let new_user = NewUser::new("a@example.com", "password");
        assert!(new_user.name.is_none());
        assert!(new_user.is_superuser.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_short_password_before_touching_db() {
        let err = manager()
            .create(NewUser::new("a@example.com", "short"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, UserManagerError::InvalidPassword(_)));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_garbage_token() {
        let err = manager()
            .reset_password("not-a-token", "new-password")
            .await
            .unwrap_err();
        assert!(matches!(err, UserManagerError::InvalidResetToken));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_access_token() {
        let users = manager();
        let claims = Claims::new(Uuid::new_v4(), TokenPurpose::Access).unwrap();
        let token = create_token(&claims, users.secret()).unwrap();

        let err = users.reset_password(&token, "new-password").await.unwrap_err();
        assert!(matches!(err, UserManagerError::InvalidResetToken));
    }

    #[tokio::test]
    async fn test_verify_rejects_reset_token() {
        let users = manager();
        let claims = Claims::new(Uuid::new_v4(), TokenPurpose::ResetPassword)
            .unwrap()
            .with_password_fingerprint(password_fingerprint("hash"));
        let token = create_token(&claims, users.secret()).unwrap();

        let err = users.verify(&token).await.unwrap_err();
        assert!(matches!(err, UserManagerError::InvalidVerifyToken));
    }

    #[tokio::test]
    async fn test_access_token_uses_configured_lifetime() {
        let users = manager().with_access_lifetime(Duration::seconds(600));
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            hashed_password: "hash".to_string(),
            name: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let token = users.issue_access_token(&user).unwrap();
        let claims = validate_token(&token, users.secret(), TokenPurpose::Access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_fails_without_panicking() {
        let users = manager().with_access_lifetime(Duration::seconds(9_000_000_000_000));
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            hashed_password: "hash".to_string(),
            name: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let err = users.issue_access_token(&user).unwrap_err();
        assert!(matches!(err, UserManagerError::Token(JwtError::CreateError(_))));
    }
}
