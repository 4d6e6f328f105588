//! JSON REST API for the Personas service.
//!
//! Exposes an axum [`Router`] backed by any [`PersonStore`]. TLS, CORS and
//! transport concerns are the caller's responsibility; the server binary
//! adds them.
//!
//! # Routes
//!
//! ```text
//! GET    /api/personas                         list
//! POST   /api/personas                         create
//! GET    /api/personas/buscar?filtro=&valor=   search
//! GET    /api/personas/{id}                    get one
//! PUT    /api/personas/{id}                    update
//! DELETE /api/personas/{id}                    delete
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod interceptor;
pub mod mapping;
pub mod personas;
pub mod search;
pub mod validation;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use personas_core::store::PersonStore;
use tower_http::catch_panic::CatchPanicLayer;

pub use error::ApiError;
use interceptor::FailureInterceptor;

/// Build the API router for `store`.
///
/// Every route is wrapped by the failure interceptor, which writes to the
/// same store's error log.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  let failures = FailureInterceptor::new(Arc::clone(&store));

  Router::new()
    .route(
      "/api/personas",
      get(personas::list::<S>).post(personas::create::<S>),
    )
    .route("/api/personas/buscar", get(search::handler::<S>))
    .route(
      "/api/personas/{id}",
      get(personas::get_one::<S>)
        .put(personas::update::<S>)
        .delete(personas::delete_one::<S>),
    )
    .fallback(unknown_route)
    .method_not_allowed_fallback(method_not_allowed)
    .with_state(store)
    // Panics become failures before the interceptor sees the response.
    .layer(CatchPanicLayer::custom(interceptor::panic_response))
    .layer(middleware::from_fn_with_state(
      failures,
      interceptor::intercept::<S>,
    ))
}

async fn unknown_route() -> ApiError {
  ApiError::NotFound("No existe el recurso solicitado.".to_owned())
}

async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }

#[cfg(test)]
mod tests;
