//! # Server Module
//!
//! HTTP server setup and route configuration for the electricians service.

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthMiddleware, JwtService};
use crate::config::ServerConfig;
use crate::database::ElectricianStore;
use crate::error::AppError;
use crate::routes::{electricians, health};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ElectricianStore>,
    pub jwt_service: Arc<JwtService>,
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Build the application router.
///
/// Reads are public. `POST /` and `DELETE /{id}` go through
/// [`AuthMiddleware::validate_token`] first; the layer is attached per
/// method so `GET /` on the same path stays open.
pub fn router(state: AppState) -> Router {
    let require_auth =
        middleware::from_fn_with_state(state.jwt_service.clone(), AuthMiddleware::validate_token);

    let public_routes = Router::new()
        .route("/", get(electricians::list))
        .route("/search", get(electricians::search))
        .route("/ping", get(health::ping))
        .route("/health", get(health::health));

    let protected_routes = Router::new()
        .route("/", post(electricians::create).route_layer(require_auth.clone()))
        .route("/{id}", delete(electricians::remove).route_layer(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Must follow the merges: it only reaches routes already registered.
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn start(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} - port may already be in use", addr))?;

    tracing::info!("🚀 Electricians service listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
