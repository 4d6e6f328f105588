//! Field-presence and format checks on inbound person bodies.
//!
//! Pure: nothing here touches the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use validator::ValidateEmail as _;

use crate::dto::{PersonCreateRequest, ValidPersonRequest};

/// Field name → human-readable messages, keyed by wire property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
  pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.entry(field).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.0.keys().copied()
  }
}

/// Check `request` and, if it is valid, return its typed form.
///
/// `firstName`, `lastName`, `birthDate` and `email` are required; a value
/// made only of whitespace counts as absent. `email` must be a syntactically
/// valid address. `phone` and `address` are unconstrained.
pub fn validate(
  request: PersonCreateRequest,
) -> Result<ValidPersonRequest, FieldErrors> {
  let mut errors = FieldErrors::default();

  let first_name = required(&mut errors, "firstName", request.first_name);
  let last_name = required(&mut errors, "lastName", request.last_name);

  let birth_date = required(&mut errors, "birthDate", request.birth_date)
    .and_then(|raw| {
      let parsed = parse_birth_date(&raw);
      if parsed.is_none() {
        errors.add("birthDate", "El campo birthDate debe ser una fecha válida.");
      }
      parsed
    });

  let email = required(&mut errors, "email", request.email).and_then(|email| {
    if email.validate_email() {
      Some(email)
    } else {
      errors.add("email", "El email debe ser válido.");
      None
    }
  });

  match (first_name, last_name, birth_date, email) {
    (Some(first_name), Some(last_name), Some(birth_date), Some(email)) => {
      Ok(ValidPersonRequest {
        first_name,
        last_name,
        birth_date,
        email,
        phone: request.phone,
        address: request.address,
      })
    }
    _ => Err(errors),
  }
}

fn required(
  errors: &mut FieldErrors,
  field: &'static str,
  value: Option<String>,
) -> Option<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Some(v),
    _ => {
      errors.add(field, format!("El campo {field} es requerido."));
      None
    }
  }
}

/// Parse a birth date and normalise it to UTC.
///
/// Values without an offset are taken to already be UTC.
pub fn parse_birth_date(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}
