//! The `PersonStore` trait.
//!
//! Implemented by storage backends (e.g. `personas-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  audit::{ErrorLogEntry, NewErrorLogEntry},
  person::{NewPerson, Person, PersonId},
  search::SearchField,
};

/// Abstraction over the relational store holding person and error-log rows.
///
/// Each write touches exactly one row and is atomic on its own; no method
/// spans a transaction across calls.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons: reads ──────────────────────────────────────────────────────

  /// All persons, in whatever order the backend yields them.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn person_exists(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Persons whose `field` contains `needle`, ignoring case.
  fn search_persons<'a>(
    &'a self,
    field: SearchField,
    needle: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Persons: writes ─────────────────────────────────────────────────────

  /// Persist a new person. The store assigns the id.
  fn insert_person(
    &self,
    input: NewPerson,
    registered_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Overwrite every caller-controlled column of row `id`.
  ///
  /// `registered_at` is never written. Returns the updated row, or `None` if
  /// no row has that id.
  fn replace_person(
    &self,
    id: PersonId,
    input: NewPerson,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Remove row `id`. Returns `false` if it did not exist.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Error log ───────────────────────────────────────────────────────────

  /// Append an error-log row.
  fn append_error(
    &self,
    entry: NewErrorLogEntry,
  ) -> impl Future<Output = Result<ErrorLogEntry, Self::Error>> + Send + '_;

  /// Every error-log row, oldest first.
  fn list_error_log(
    &self,
  ) -> impl Future<Output = Result<Vec<ErrorLogEntry>, Self::Error>> + Send + '_;
}
