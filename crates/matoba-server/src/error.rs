//! Error types and axum `IntoResponse` implementation for the admin routes.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use matoba_api::ApiError;
use matoba_core::validate::ValidationError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("invalid submission: {0}")]
  Invalid(#[from] ValidationError),
  #[error(transparent)]
  Api(#[from] ApiError),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
  let body = json!({ "success": false, "error": message.into() });
  (status, Json(body)).into_response()
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = failure(StatusCode::UNAUTHORIZED, "Authentication required");
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"matoba\""),
        );
        res
      }
      Error::NotFound(msg) => failure(StatusCode::NOT_FOUND, msg),
      Error::BadRequest(msg) => failure(StatusCode::BAD_REQUEST, msg),
      Error::Invalid(e) => {
        tracing::warn!(error = %e, "rejected submission");
        failure(StatusCode::BAD_REQUEST, e.message())
      }
      Error::Api(e) => e.into_response(),
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Error saving data")
      }
    }
  }
}
