//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Identity-provisioning rejections; carries the provider's descriptions.
  #[error("validation failed")]
  Validation(Vec<String>),

  /// Failed login or a missing/invalid token. Unknown email and wrong
  /// password produce the same message so accounts cannot be enumerated.
  #[error("invalid credentials")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  /// The welcome-email path re-raises transport failures to the caller.
  #[error("mail delivery failed: {0}")]
  Mail(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "error": m }))
      }
      ApiError::Validation(details) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "validation failed", "details": details }),
      ),
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        json!({ "error": "invalid credentials" }),
      ),
      ApiError::Forbidden => {
        (StatusCode::FORBIDDEN, json!({ "error": "forbidden" }))
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Mail(m) => (
        StatusCode::BAD_GATEWAY,
        json!({ "error": format!("mail delivery failed: {m}") }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "internal error" }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
