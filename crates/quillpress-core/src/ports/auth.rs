//! Authentication and authorization ports.

use uuid::Uuid;

use crate::domain::{Actor, Principal, PrincipalKind, Role};

/// Who a token is issued to.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub kind: PrincipalKind,
    pub role: Role,
}

/// Claims stored in JWT tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub guard: PrincipalKind,
    pub exp: i64,
}

impl TokenClaims {
    /// Rebuild the principal. The guard picks the variant, the role claim its capability.
    pub fn principal(&self) -> Result<Principal, AuthError> {
        let role = match self.roles.as_slice() {
            [role] => role
                .parse::<Role>()
                .map_err(AuthError::InvalidToken)?,
            _ => {
                return Err(AuthError::InvalidToken(
                    "token must carry exactly one role".to_string(),
                ));
            }
        };
        let actor = Actor {
            id: self.user_id,
            role,
        };
        Ok(match self.guard {
            PrincipalKind::Author => Principal::Author(actor),
            PrincipalKind::Admin => Principal::Administrator(actor),
        })
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate an access token.
    fn generate_token(&self, subject: &TokenSubject) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Spend the effort of a verification when no account matched.
    fn verify_dummy(&self, password: &str);
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
