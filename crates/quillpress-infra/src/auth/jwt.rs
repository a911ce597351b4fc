//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quillpress_core::domain::PrincipalKind;
use quillpress_core::ports::{AuthError, TokenClaims, TokenService, TokenSubject};

const DEFAULT_SECRET: &str = "change-me-in-production";
const DEFAULT_ISSUER: &str = "quillpress-api";

/// Signing and lifetime settings for bearer tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        if config.secret == DEFAULT_SECRET {
            let production = std::env::var("RUST_ENV")
                .is_ok_and(|v| v == "production" || v == "prod");
            if production {
                tracing::error!("JWT_SECRET is unset in production, sessions can be forged");
            } else {
                tracing::warn!("JWT_SECRET is unset, using the development secret");
            }
        }
        config
    }

    fn ttl(&self) -> TimeDelta {
        TimeDelta::hours(self.expiration_hours)
    }
}

/// Registered claims plus the principal's guard and role.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    name: String,
    email: String,
    roles: Vec<String>,
    guard: PrincipalKind,
    exp: i64,
    iat: i64,
    iss: String,
}

impl From<SessionClaims> for TokenClaims {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
            guard: claims.guard,
            exp: claims.exp,
        }
    }
}

/// HS256 bearer tokens for authors and administrators.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let claims = SessionClaims {
            sub: subject.user_id,
            name: subject.name.clone(),
            email: subject.email.clone(),
            roles: vec![subject.role.as_str().to_string()],
            guard: subject.kind,
            exp: (issued_at + self.config.ttl()).timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.ttl().num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpress_core::domain::{Principal, Role};

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn subject(kind: PrincipalKind, role: Role) -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            kind,
            role,
        }
    }

    #[test]
    fn test_author_token_round_trips_to_author_principal() {
        let service = JwtTokenService::new(test_config());
        let subject = subject(PrincipalKind::Author, Role::Writer);

        let token = service.generate_token(&subject).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, subject.user_id);
        assert_eq!(claims.email, "grace@example.com");
        assert_eq!(claims.roles, vec!["writer".to_string()]);
        assert_eq!(claims.principal().unwrap(), Principal::author(subject.user_id));
    }

    #[test]
    fn test_admin_token_carries_admin_guard() {
        let service = JwtTokenService::new(test_config());
        let subject = subject(PrincipalKind::Admin, Role::Admin);

        let token = service.generate_token(&subject).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.guard, PrincipalKind::Admin);
        assert!(claims.principal().unwrap().is_administrator());
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate_token("invalid-token");

        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            secret: "same-secret".to_string(),
            expiration_hours: 1,
            issuer: "issuer1".to_string(),
        });
        let service2 = JwtTokenService::new(JwtConfig {
            secret: "same-secret".to_string(),
            expiration_hours: 1,
            issuer: "issuer2".to_string(),
        });

        let token = service1
            .generate_token(&subject(PrincipalKind::Author, Role::Writer))
            .unwrap();

        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: -2,
            ..test_config()
        });
        let token = service
            .generate_token(&subject(PrincipalKind::Author, Role::Writer))
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_expiration_seconds() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: 24,
            ..test_config()
        });

        assert_eq!(service.expiration_seconds(), 86400);
    }
}
