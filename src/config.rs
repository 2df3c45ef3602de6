//! Configuration module for environment variables and application settings
//!
//! Loaded once in `main` and passed by reference to whatever needs it.

use anyhow::{anyhow, Context, Result};
use std::env;

use crate::database::DatabaseConfig;

pub const DEFAULT_PORT: u16 = 1337;

#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Token signing configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Result<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SIGNER_SECRET must not be empty"));
        }
        Ok(Self { jwt_secret })
    }

    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SIGNER_SECRET")
            .map_err(|_| anyhow!("JWT_SIGNER_SECRET environment variable is required"))?;
        Self::new(secret)
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a port number")?,
                Err(_) => DEFAULT_PORT,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            auth: AuthConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_requires_secret() {
        assert!(AuthConfig::new("").is_err());
        assert!(AuthConfig::new("   ").is_err());
        assert_eq!(AuthConfig::new("s3cret").unwrap().jwt_secret, "s3cret");
    }

    #[test]
    fn test_auth_config_debug_hides_secret() {
        let config = AuthConfig::new("s3cret").unwrap();
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:1337");
    }
}
