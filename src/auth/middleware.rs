//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::AppError;

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens
    ///
    /// Rejects the request before the wrapped handler runs when the bearer
    /// token is missing or fails verification. On success the decoded
    /// [`AuthUser`] is placed in the request extensions, where protected
    /// handlers take it as an `Extension<AuthUser>` argument.
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let token = match bearer_token(req.headers()) {
            Some(token) => token,
            None => {
                tracing::warn!(
                    "[AuthMiddleware] Missing or malformed Authorization header: {} {}",
                    req.method(),
                    req.uri()
                );
                return Err(AppError::Unauthorized);
            }
        };

        let claims = jwt_service.verify(token).map_err(|e| {
            tracing::warn!("[AuthMiddleware] JWT validation failed: {:?}", e);
            AppError::InvalidToken
        })?;

        let auth_user = AuthUser::from(claims);
        tracing::debug!(
            "[AuthMiddleware] Authenticated id={}, permission_level={}",
            auth_user.id,
            auth_user.permission_level
        );

        req.extensions_mut().insert(auth_user);

        Ok(next.run(req).await)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        middleware,
        routing::post,
        Extension, Router,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn guarded_app(jwt_service: Arc<JwtService>, called: Arc<AtomicBool>) -> Router {
        Router::new()
            .route(
                "/",
                post(move |Extension(user): Extension<AuthUser>| {
                    let called = called.clone();
                    async move {
                        called.store(true, Ordering::SeqCst);
                        user.id
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(
                jwt_service,
                AuthMiddleware::validate_token,
            ))
    }

    async fn send(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_valid_token_forwards_with_identity() {
        let jwt_service = Arc::new(JwtService::new("middleware_secret").unwrap());
        let signed = jwt_service.issue("user-42", Some("a@b.c"), 2).unwrap();
        let called = Arc::new(AtomicBool::new(false));

        let (status, body) = send(
            guarded_app(jwt_service, called.clone()),
            Some(&format!("Bearer {}", signed.token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user-42");
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let jwt_service = Arc::new(JwtService::new("middleware_secret").unwrap());
        let called = Arc::new(AtomicBool::new(false));

        let (status, body) = send(guarded_app(jwt_service, called.clone()), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Unauthorized"}"#);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let jwt_service = Arc::new(JwtService::new("middleware_secret").unwrap());
        let called = Arc::new(AtomicBool::new(false));

        let (status, _) = send(
            guarded_app(jwt_service, called.clone()),
            Some("Basic dXNlcjpwYXNz"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_invalid_token_never_reaches_handler() {
        let jwt_service = Arc::new(JwtService::new("middleware_secret").unwrap());
        let foreign = JwtService::new("someone_else").unwrap().issue("user-42", None, 9).unwrap();
        let called = Arc::new(AtomicBool::new(false));

        let (status, body) = send(
            guarded_app(jwt_service, called.clone()),
            Some(&format!("Bearer {}", foreign.token)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Invalid token."}"#);
        assert!(!called.load(Ordering::SeqCst));
    }
}
