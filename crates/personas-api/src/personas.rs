//! Handlers for `/api/personas` endpoints.
//!
//! | Method   | Path                  | Notes |
//! |----------|-----------------------|-------|
//! | `GET`    | `/api/personas`       | All persons |
//! | `POST`   | `/api/personas`       | Body: [`PersonCreateRequest`]; 201 + `Location` |
//! | `GET`    | `/api/personas/{id}`  | 404 if not found |
//! | `PUT`    | `/api/personas/{id}`  | Full replacement; 204; `registeredAt` kept |
//! | `DELETE` | `/api/personas/{id}`  | 204; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use personas_core::{person::PersonId, store::PersonStore};

use crate::{
  dto::{PersonCreateRequest, PersonResponse},
  error::ApiError,
  extract::{ApiJson, ApiPath},
  mapping, validation,
};

/// Path at which a created person can be fetched.
pub fn person_location(id: PersonId) -> String { format!("/api/personas/{id}") }

fn not_found(id: PersonId) -> ApiError {
  tracing::debug!(id, "person not found");
  ApiError::NotFound(format!("No se encontró una persona con ID {id}."))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/personas`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PersonResponse>>, ApiError>
where
  S: PersonStore,
{
  let persons = store.list_persons().await.map_err(ApiError::unexpected)?;
  Ok(Json(persons.into_iter().map(mapping::to_response).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/personas/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<PersonId>,
) -> Result<Json<PersonResponse>, ApiError>
where
  S: PersonStore,
{
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::unexpected)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(mapping::to_response(person)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/personas`: returns 201, the stored person, and a `Location`
/// header pointing at `GET /api/personas/{id}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<PersonCreateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let request = validation::validate(body).map_err(|errors| {
    tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "rejected create");
    ApiError::Validation(errors)
  })?;

  let person = store
    .insert_person(mapping::to_entity(request), Utc::now())
    .await
    .map_err(ApiError::unexpected)?;
  tracing::info!(id = person.id, "person created");

  Ok((
    StatusCode::CREATED,
    [(header::LOCATION, person_location(person.id))],
    Json(mapping::to_response(person)),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/personas/{id}`: replaces every caller-controlled field.
///
/// The path id always wins; any id in the body is ignored. `registeredAt`
/// is never touched.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<PersonId>,
  ApiJson(body): ApiJson<PersonCreateRequest>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
{
  let request = validation::validate(body).map_err(|errors| {
    tracing::debug!(id, fields = ?errors.fields().collect::<Vec<_>>(), "rejected update");
    ApiError::Validation(errors)
  })?;

  if !store.person_exists(id).await.map_err(ApiError::unexpected)? {
    return Err(not_found(id));
  }

  store
    .replace_person(id, mapping::to_entity(request))
    .await
    .map_err(ApiError::unexpected)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(id, "person updated");

  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/personas/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
{
  let missing = || {
    tracing::debug!(id, "person to delete not found");
    ApiError::NotFound(format!(
      "No se encontró una persona con ID {id} para eliminar."
    ))
  };

  if !store.person_exists(id).await.map_err(ApiError::unexpected)? {
    return Err(missing());
  }
  if !store.delete_person(id).await.map_err(ApiError::unexpected)? {
    return Err(missing());
  }
  tracing::info!(id, "person deleted");

  Ok(StatusCode::NO_CONTENT)
}
