//! Authentication Models
//!
//! Identity handed from the auth middleware to protected handlers.

use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub permission_level: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            permission_level: claims.permission_level,
        }
    }
}
