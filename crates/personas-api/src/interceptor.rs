//! The global failure interceptor.
//!
//! Unexpected handler errors and panics both become an [`UnhandledFailure`]
//! carried in the response extensions. [`intercept`] sits outside every
//! route, appends one error-log row per failure, and replaces the response
//! with the fixed `500` envelope. Nothing from the failure reaches the
//! client.

use std::{any::Any, sync::Arc};

use axum::{
  Json,
  extract::{Request, State},
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use personas_core::{audit::NewErrorLogEntry, store::PersonStore};
use serde_json::json;

/// The only message a client ever sees for a `500`.
pub const UNEXPECTED_MESSAGE: &str = "Ha ocurrido un error inesperado.";

/// The fixed body of every `500` response.
pub fn envelope() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({
      "type":    "error",
      "message": UNEXPECTED_MESSAGE,
      "status":  500,
    })),
  )
    .into_response()
}

// ─── Failure details ─────────────────────────────────────────────────────────

/// What went wrong, as recorded in the error log.
#[derive(Debug, Clone)]
pub struct UnhandledFailure {
  pub message: String,
  pub trace:   Option<String>,
}

impl UnhandledFailure {
  /// Capture `err` and its `source()` chain.
  pub fn from_error(err: &(dyn std::error::Error + Send + Sync + 'static)) -> Self {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
      causes.push(format!("caused by: {cause}"));
      source = cause.source();
    }

    Self {
      message: err.to_string(),
      trace:   (!causes.is_empty()).then(|| causes.join("\n")),
    }
  }

  pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "non-string panic payload".to_owned()
    };

    Self { message: format!("handler panicked: {detail}"), trace: None }
  }
}

impl IntoResponse for UnhandledFailure {
  fn into_response(self) -> Response {
    let mut response = envelope();
    response.extensions_mut().insert(self);
    response
  }
}

/// Response for a panic caught by `tower_http::catch_panic::CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
  tracing::error!("handler panicked");
  UnhandledFailure::from_panic(&*payload).into_response()
}

// ─── Interceptor ─────────────────────────────────────────────────────────────

/// Holds the store the error log is written to. Built once at startup.
pub struct FailureInterceptor<S> {
  store: Arc<S>,
}

impl<S> Clone for FailureInterceptor<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: PersonStore> FailureInterceptor<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Append `failure` to the error log. A failed append is logged and
  /// dropped.
  pub async fn record(&self, failure: UnhandledFailure) {
    let entry = NewErrorLogEntry::now(failure.message, failure.trace);
    match self.store.append_error(entry).await {
      Ok(logged) => {
        tracing::error!(
          error_log_id = logged.id,
          message = %logged.message,
          "unhandled failure recorded"
        );
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to record unhandled failure");
      }
    }
  }
}

/// Middleware: turn any response carrying an [`UnhandledFailure`] into the
/// fixed envelope after logging it.
pub async fn intercept<S>(
  State(interceptor): State<FailureInterceptor<S>>,
  request: Request,
  next: Next,
) -> Response
where
  S: PersonStore + 'static,
{
  let mut response = next.run(request).await;
  match response.extensions_mut().remove::<UnhandledFailure>() {
    Some(failure) => {
      interceptor.record(failure).await;
      envelope()
    }
    None => response,
  }
}
