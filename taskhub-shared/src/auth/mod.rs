/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and the password policy
/// - [`jwt`]: purpose-scoped HS256 tokens
/// - [`middleware`]: bearer token parsing and the authenticated [`middleware::Principal`]
/// - [`authorization`]: admin checks and the task scope override
/// - [`hooks`]: user lifecycle callbacks
/// - [`manager`]: registration, login, reset, verification, profile updates
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password, verify_password};
/// use taskhub_shared::auth::jwt::{create_token, Claims, TokenPurpose};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4(), TokenPurpose::Access)?, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod hooks;
pub mod jwt;
pub mod manager;
pub mod middleware;
pub mod password;
