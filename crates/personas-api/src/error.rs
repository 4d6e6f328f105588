//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use personas_core::search::SearchField;
use serde_json::json;
use thiserror::Error;

use crate::{interceptor::UnhandledFailure, validation::FieldErrors};

/// An error returned by an API handler.
///
/// Every variant except [`ApiError::Unexpected`] is answered directly with a
/// specific message. `Unexpected` is left for the failure interceptor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed: {0:?}")]
  Validation(FieldErrors),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request body could not be read as JSON; carries the rejection's
  /// status (`400`, `413`, `415` or `422`).
  #[error("unreadable body ({0})")]
  UnreadableBody(StatusCode),

  #[error("method not allowed")]
  MethodNotAllowed,

  #[error("unexpected error: {0}")]
  Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn unexpected<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Unexpected(Box::new(err))
  }

  /// The guidance answer for a search without a usable `filtro`/`valor`.
  pub fn search_guidance() -> Self {
    Self::BadRequest(format!(
      "Debe especificar un valor para buscar y un filtro válido ({}).",
      SearchField::allowed()
    ))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    tracing::debug!(reason = %rejection.body_text(), "rejected request body");
    Self::UnreadableBody(rejection.status())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    tracing::debug!(reason = %rejection.body_text(), "rejected query string");
    Self::search_guidance()
  }
}

impl From<PathRejection> for ApiError {
  fn from(_: PathRejection) -> Self {
    Self::BadRequest("El ID debe ser un número entero.".to_owned())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "message": "Uno o más campos no son válidos.",
          "errors":  errors,
        })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": m }))).into_response()
      }
      ApiError::UnreadableBody(status) => {
        let message = match status {
          StatusCode::PAYLOAD_TOO_LARGE => {
            "El cuerpo de la petición es demasiado grande."
          }
          StatusCode::UNPROCESSABLE_ENTITY => {
            "El cuerpo de la petición no tiene el formato esperado."
          }
          StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            "El cuerpo de la petición debe enviarse como application/json."
          }
          _ => "El cuerpo de la petición no es un JSON válido.",
        };
        (status, Json(json!({ "message": message }))).into_response()
      }
      ApiError::MethodNotAllowed => (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Método no permitido para este recurso." })),
      )
        .into_response(),
      // Logged once, by the failure interceptor.
      ApiError::Unexpected(e) => UnhandledFailure::from_error(&*e).into_response(),
    }
  }
}
