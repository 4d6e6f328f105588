//! Conversions between wire shapes and store entities.
//!
//! Both directions are plain field copies. [`to_response`] is the only way a
//! stored row reaches the wire, so any column added to [`Person`] stays
//! private until it is copied here.

use personas_core::person::{NewPerson, Person};

use crate::dto::{PersonResponse, ValidPersonRequest};

/// Build the caller-controlled columns from a validated body. `id` and
/// `registered_at` are left to the store.
pub fn to_entity(request: ValidPersonRequest) -> NewPerson {
  NewPerson {
    first_name: request.first_name,
    last_name:  request.last_name,
    birth_date: request.birth_date,
    email:      request.email,
    phone:      request.phone,
    address:    request.address,
  }
}

pub fn to_response(person: Person) -> PersonResponse {
  PersonResponse {
    id:            person.id,
    first_name:    person.first_name,
    last_name:     person.last_name,
    birth_date:    person.birth_date,
    email:         person.email,
    phone:         person.phone,
    address:       person.address,
    registered_at: person.registered_at,
  }
}
