//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Core(e) => match e {
        CoreError::NotAuthenticated | CoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        CoreError::NotAuthorized => StatusCode::FORBIDDEN,
        CoreError::EventNotFound(_) | CoreError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::EmailAlreadyRegistered(_)
        | CoreError::AlreadyRegistered(_)
        | CoreError::NotRegistered(_) => StatusCode::CONFLICT,
        CoreError::MissingRecipient => StatusCode::BAD_REQUEST,
        CoreError::Storage(_) | CoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
