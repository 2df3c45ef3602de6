//! JWT Token Service
//!
//! Issues and verifies the HMAC-signed bearer tokens that gate the mutating
//! electrician endpoints. Claim names match the tokens minted by the
//! companion auth service (`id`, `email`, `permissionLevel`, `exp`).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long an issued token stays valid.
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

/// JWT Claims structure containing user identity and permission level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Opaque subject identifier
    pub id: String,
    /// User email, absent in tokens from issuers that do not carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Numeric authorization tier
    #[serde(rename = "permissionLevel")]
    pub permission_level: i64,
    /// Token expiration timestamp (epoch seconds)
    pub exp: i64,
}

/// A signed token string together with its expiry
#[derive(Debug, Clone, Serialize)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("no token provided")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("token has an empty id claim")]
    EmptySubject,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Create a new JWT service with the provided secret
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Only the HMAC family is accepted, whatever the token header claims.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // A token is dead the second its `exp` passes.
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Issue a token valid for 24 hours from now
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        permission_level: i64,
    ) -> Result<SignedToken, AuthError> {
        self.issue_at(subject, email, permission_level, Utc::now())
    }

    /// Issue a token as if it were minted at `issued_at`
    pub fn issue_at(
        &self,
        subject: &str,
        email: Option<&str>,
        permission_level: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<SignedToken, AuthError> {
        let expires_at = (issued_at + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp();

        let claims = Claims {
            id: subject.to_string(),
            email: email.map(str::to_string),
            permission_level,
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)?;

        Ok(SignedToken { token, expires_at })
    }

    /// Validate a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        if data.claims.id.is_empty() {
            return Err(AuthError::EmptySubject);
        }

        Ok(data.claims)
    }
}
