//! # Electricians Service
//!
//! A small HTTP API over a directory of electricians, built with Axum and
//! Tokio. Reads are public; creating and deleting records requires a bearer
//! token signed with the shared `JWT_SIGNER_SECRET`.
//!
//! ## Architecture
//! - `server`: router wiring and server lifecycle
//! - `config`: configuration read once from the environment
//! - `auth`: token issuance/verification and the auth middleware
//! - `database`: the store seam with PostgreSQL and in-memory backends
//! - `routes`: HTTP handlers
//!
//! ## Running the Server
//! ```bash
//! JWT_SIGNER_SECRET=change-me cargo run            # PostgreSQL backend
//! JWT_SIGNER_SECRET=change-me cargo run -- serve --memory
//! ```
//!
//! The server listens on `0.0.0.0:1337` unless `SERVER_HOST` / `PORT` say
//! otherwise.
//!
//! ## Minting a token
//! ```bash
//! JWT_SIGNER_SECRET=change-me cargo run -- issue-token --subject 42 --permission-level 1
//! ```

mod auth;
mod cli;
mod config;
mod database;
mod error;
mod routes;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtService;
use crate::cli::{Cli, Commands};
use crate::config::{AuthConfig, Config};
use crate::database::{DatabaseConnection, ElectricianStore, MemoryStore};
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    match Cli::parse().into_command() {
        Commands::Serve { memory } => serve(memory).await,
        Commands::IssueToken {
            subject,
            email,
            permission_level,
        } => issue_token(&subject, email.as_deref(), permission_level),
    }
}

async fn serve(memory: bool) -> Result<()> {
    tracing::info!("🏁 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let jwt_service = Arc::new(
        JwtService::new(&config.auth.jwt_secret).context("Failed to set up token signing")?,
    );

    let store: Arc<dyn ElectricianStore> = if memory {
        tracing::warn!("⚠️  Using in-memory store; records are lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let db = DatabaseConnection::new(&config.database).await?;
        db.migrate().await?;
        Arc::new(db)
    };

    let state = AppState { store, jwt_service };
    server::start(&config.server, state).await
}

fn issue_token(subject: &str, email: Option<&str>, permission_level: i64) -> Result<()> {
    let auth = AuthConfig::from_env()?;
    let jwt_service = JwtService::new(&auth.jwt_secret)?;

    let signed = jwt_service.issue(subject, email, permission_level)?;
    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}
