//! # Authentication Module
//!
//! Bearer token issuance and verification, plus the middleware that guards
//! the mutating electrician endpoints.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtService;
pub use middleware::AuthMiddleware;
pub use models::AuthUser;
