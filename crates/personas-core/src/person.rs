//! Person, the single record type managed by the service.

use chrono::{DateTime, Utc};

/// Store-assigned primary key of a [`Person`].
pub type PersonId = i64;

/// A persisted person row.
///
/// `id` and `registered_at` are assigned once, at creation, and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub id:            PersonId,
  pub first_name:    String,
  pub last_name:     String,
  /// Always UTC.
  pub birth_date:    DateTime<Utc>,
  pub email:         String,
  pub phone:         Option<String>,
  pub address:       Option<String>,
  /// Server-assigned creation instant.
  pub registered_at: DateTime<Utc>,
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// The caller-controlled columns of a person.
///
/// Input to [`crate::store::PersonStore::insert_person`] and
/// [`crate::store::PersonStore::replace_person`]. Carries neither `id` nor
/// `registered_at`; those belong to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub first_name: String,
  pub last_name:  String,
  pub birth_date: DateTime<Utc>,
  pub email:      String,
  pub phone:      Option<String>,
  pub address:    Option<String>,
}

impl NewPerson {
  /// Attach the store-owned columns, producing the full row.
  pub fn into_person(self, id: PersonId, registered_at: DateTime<Utc>) -> Person {
    Person {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      birth_date: self.birth_date,
      email: self.email,
      phone: self.phone,
      address: self.address,
      registered_at,
    }
  }
}
