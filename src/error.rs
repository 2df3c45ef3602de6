//! HTTP API error type
//!
//! Every handler and middleware failure ends up here and is rendered as
//! `{"message": "..."}` with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error")]
    Database(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Store failures are detailed in the log only.
        if let AppError::Database(source) = &self {
            tracing::error!("Store operation failed: {:?}", source);
        }

        let body = Json(json!({ "message": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_error_shapes() {
        assert_eq!(
            render(AppError::BadRequest("Incorrect body".into())).await,
            (StatusCode::BAD_REQUEST, r#"{"message":"Incorrect body"}"#.to_string())
        );
        assert_eq!(
            render(AppError::NotFound).await,
            (StatusCode::NOT_FOUND, r#"{"message":"Not found"}"#.to_string())
        );
        assert_eq!(
            render(AppError::MethodNotAllowed).await,
            (
                StatusCode::METHOD_NOT_ALLOWED,
                r#"{"message":"Method not allowed"}"#.to_string()
            )
        );
        assert_eq!(
            render(AppError::InvalidToken).await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let error = AppError::from(StoreError::InvalidRecord("partial location".into()));
        assert_eq!(
            render(error).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"message":"Database error"}"#.to_string()
            )
        );
    }
}
