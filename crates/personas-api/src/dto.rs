//! Wire shapes for person requests and responses.
//!
//! Property names are camelCase. Inbound bodies also accept the Spanish
//! property names (`nombre`, `apellido`, `fechaNacimiento`, `telefono`,
//! `direccion`) used by earlier clients.

use chrono::{DateTime, Utc};
use personas_core::person::PersonId;
use serde::{Deserialize, Serialize};

/// JSON body accepted by `POST /api/personas` and `PUT /api/personas/{id}`.
///
/// Every field is optional at the serde level so that missing fields surface
/// as field errors from [`crate::validation::validate`] rather than as a
/// deserialisation failure. Unknown properties, including `id` and
/// `registeredAt`, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCreateRequest {
  #[serde(alias = "nombre")]
  pub first_name: Option<String>,
  #[serde(alias = "apellido")]
  pub last_name:  Option<String>,
  /// RFC 3339, naive date-time (taken as UTC), or `YYYY-MM-DD`.
  #[serde(alias = "fechaNacimiento")]
  pub birth_date: Option<String>,
  pub email:      Option<String>,
  #[serde(alias = "telefono")]
  pub phone:      Option<String>,
  #[serde(alias = "direccion")]
  pub address:    Option<String>,
}

/// A [`PersonCreateRequest`] that passed validation: required fields are
/// present and `birth_date` is normalised to UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPersonRequest {
  pub first_name: String,
  pub last_name:  String,
  pub birth_date: DateTime<Utc>,
  pub email:      String,
  pub phone:      Option<String>,
  pub address:    Option<String>,
}

/// The outbound projection of a stored person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
  pub id:            PersonId,
  pub first_name:    String,
  pub last_name:     String,
  pub birth_date:    DateTime<Utc>,
  pub email:         String,
  pub phone:         Option<String>,
  pub address:       Option<String>,
  pub registered_at: DateTime<Utc>,
}
