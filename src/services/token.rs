//! Bearer token issuance and verification
//!
//! Token verification is modeled as a capability: the `Authenticator`
//! trait exposes a single `verify(token) -> Identity` operation, so the
//! HTTP middleware depends on the capability and not on the token format.
//! `JwtAuthenticator` is the production implementation: HS256-signed JWTs
//! carrying the user's id and name, verified against a shared secret.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Claims carried by an issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id
    pub sub: String,
    /// The user's display name
    pub name: String,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
}

/// The identity a verified token resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Token verification errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Capability interface for verifying bearer tokens.
///
/// Implementations resolve a raw token string to the identity it proves,
/// or reject it. Nothing here knows about HTTP.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}

/// JWT-based authenticator using a shared signing secret
pub struct JwtAuthenticator {
    secret: String,
    token_ttl_secs: u64,
}

impl JwtAuthenticator {
    pub fn new(secret: impl Into<String>, token_ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.secret.clone(), config.token_ttl_secs)
    }

    /// Issue a signed token for the given user
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs as i64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))?;

        Ok(Identity {
            user_id,
            username: data.claims.name,
        })
    }
}
