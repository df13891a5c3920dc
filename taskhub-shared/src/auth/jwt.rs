/// JWT token generation and validation module
///
/// Tokens are signed with HS256 and scoped by audience, so a token minted
/// for one purpose is rejected everywhere else.
///
/// # Token Purposes
///
/// | Purpose         | Audience         | Extra claim      |
/// |-----------------|------------------|------------------|
/// | Access          | `taskhub:auth`   |                  |
/// | Reset password  | `taskhub:reset`  | `password_fgpt`  |
/// | Verify email    | `taskhub:verify` | `email`          |
///
/// The reset token carries a fingerprint of the password hash it was issued
/// against; once the password changes the fingerprint no longer matches and
/// the token is dead even if unexpired.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims, TokenPurpose};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, TokenPurpose::Access)?;
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret, TokenPurpose::Access)?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Lifetime of reset-password and verify tokens
pub const ACTION_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Default access token lifetime
pub const DEFAULT_ACCESS_LIFETIME_SECONDS: i64 = 3600;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    /// Signed for a different purpose
    #[error("Invalid audience: expected {expected}")]
    InvalidAudience { expected: &'static str },
}

/// What a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Access,
    ResetPassword,
    Verify,
}

impl TokenPurpose {
    /// `aud` claim value
    pub fn audience(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "taskhub:auth",
            TokenPurpose::ResetPassword => "taskhub:reset",
            TokenPurpose::Verify => "taskhub:verify",
        }
    }

    /// Lifetime used when no explicit one is given
    pub fn default_lifetime(&self) -> Duration {
        match self {
            TokenPurpose::Access => Duration::seconds(DEFAULT_ACCESS_LIFETIME_SECONDS),
            TokenPurpose::ResetPassword | TokenPurpose::Verify => {
                Duration::seconds(ACTION_TOKEN_LIFETIME_SECONDS)
            }
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Audience - purpose of the token
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// SHA-256 of the password hash (reset tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fgpt: Option<String>,

    /// Address being verified (verify tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Claims with the purpose's default lifetime
    pub fn new(user_id: Uuid, purpose: TokenPurpose) -> Result<Self, JwtError> {
        Self::with_expiration(user_id, purpose, purpose.default_lifetime())
    }

    /// Claims with a custom lifetime
    ///
    /// # Errors
    ///
    /// `JwtError::CreateError` when the expiry falls outside the representable
    /// date range.
    pub fn with_expiration(
        user_id: Uuid,
        purpose: TokenPurpose,
        expires_in: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(expires_in).ok_or_else(|| {
            JwtError::CreateError(format!("Token lifetime out of range: {}", expires_in))
        })?;

        Ok(Self {
            sub: user_id,
            aud: purpose.audience().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            password_fgpt: None,
            email: None,
        })
    }

    pub fn with_password_fingerprint(mut self, fingerprint: String) -> Self {
        self.password_fgpt = Some(fingerprint);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, expiry and audience
///
/// # Errors
///
/// - `JwtError::Expired` past `exp` (with the library's default leeway)
/// - `JwtError::InvalidAudience` when minted for another purpose
/// - `JwtError::ValidationError` for anything else (bad signature, garbage)
pub fn validate_token(token: &str, secret: &str, purpose: TokenPurpose) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[purpose.audience()]);
    validation.set_required_spec_claims(&["exp", "aud", "sub"]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience {
            expected: purpose.audience(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Hex SHA-256 of a stored password hash
pub fn password_fingerprint(hashed_password: &str) -> String {
    hex::encode(Sha256::digest(hashed_password.as_bytes()))
}
