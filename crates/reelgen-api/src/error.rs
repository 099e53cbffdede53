//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use reelgen_firestore::FirestoreError;
use reelgen_synthesis::{GenerationError, SynthesisError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::Firestore(FirestoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Synthesis(e) => match e {
                SynthesisError::Input(_) => StatusCode::BAD_REQUEST,
                SynthesisError::Generation(GenerationError::RateLimited) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                SynthesisError::Generation(GenerationError::Timeout(_)) => {
                    StatusCode::GATEWAY_TIMEOUT
                }
                SynthesisError::Generation(_) | SynthesisError::ParseFatal(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Internal(_) | ApiError::Firestore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code returned with every error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation_error",
            ApiError::RateLimited => "rate_limited",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal(_) => "internal_error",
            ApiError::Synthesis(e) => e.code(),
            ApiError::Firestore(FirestoreError::NotFound(_)) => "not_found",
            ApiError::Firestore(_) => "storage_error",
        }
    }

    /// Whether the message may carry backend internals.
    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_)
                | ApiError::Firestore(_)
                | ApiError::Synthesis(SynthesisError::Generation(_))
                | ApiError::Synthesis(SynthesisError::ParseFatal(_))
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let production = std::env::var("ENVIRONMENT")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        let detail = if production && self.is_internal() {
            match status {
                StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred".to_string(),
                _ => "Scene generation failed, please try again".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            detail,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_status_mapping() {
        let cases = [
            (SynthesisError::input("empty scenario"), StatusCode::BAD_REQUEST),
            (SynthesisError::parse_fatal("prose"), StatusCode::BAD_GATEWAY),
            (GenerationError::Status(500, "x".into()).into(), StatusCode::BAD_GATEWAY),
            (GenerationError::RateLimited.into(), StatusCode::TOO_MANY_REQUESTS),
            (GenerationError::Timeout(90).into(), StatusCode::GATEWAY_TIMEOUT),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_firestore_not_found_is_404() {
        let err = ApiError::from(FirestoreError::not_found("users/u/character_projects/p"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");

        let err = ApiError::from(FirestoreError::ServerError(503, "down".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::Validation("Character name is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "validation_error");
        assert_eq!(
            body["detail"],
            "Validation error: Character name is required"
        );
    }
}
