//! Handler for `GET /api/personas/buscar`.
//!
//! Both `filtro` (one of `nombre`, `apellido`, `email`) and `valor` are
//! required. An empty match set is a `200` with an empty array.

use std::sync::Arc;

use axum::{Json, extract::State};
use personas_core::{search::SearchField, store::PersonStore};
use serde::Deserialize;

use crate::{dto::PersonResponse, error::ApiError, extract::ApiQuery, mapping};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Which attribute to match: `nombre`, `apellido` or `email`.
  pub filtro: Option<String>,
  /// Substring to look for; trimmed, matched ignoring case.
  pub valor:  Option<String>,
}

/// `GET /api/personas/buscar?filtro=<field>&valor=<text>`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<PersonResponse>>, ApiError>
where
  S: PersonStore,
{
  let valor = params
    .valor
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or_else(ApiError::search_guidance)?;
  let filtro = params.filtro.as_deref().ok_or_else(ApiError::search_guidance)?;

  let field = SearchField::parse(filtro).map_err(|_| {
    ApiError::BadRequest(format!(
      "Filtro no reconocido. Use: {}.",
      SearchField::allowed()
    ))
  })?;

  let persons = store
    .search_persons(field, valor)
    .await
    .map_err(ApiError::unexpected)?;
  if persons.is_empty() {
    tracing::debug!(%field, valor, "search matched no persons");
  }

  Ok(Json(persons.into_iter().map(mapping::to_response).collect()))
}
