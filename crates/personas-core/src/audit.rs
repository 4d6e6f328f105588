//! Error-log rows written by the failure interceptor.
//!
//! The log is append-only: rows are never updated or deleted, and the HTTP
//! surface never reads them back.

use chrono::{DateTime, Utc};

/// A persisted error-log row.
#[derive(Debug, Clone)]
pub struct ErrorLogEntry {
  pub id:          i64,
  pub occurred_at: DateTime<Utc>,
  pub message:     String,
  /// Source chain or panic location, when one was available.
  pub trace:       Option<String>,
}

/// Input to [`crate::store::PersonStore::append_error`].
#[derive(Debug, Clone)]
pub struct NewErrorLogEntry {
  pub occurred_at: DateTime<Utc>,
  pub message:     String,
  pub trace:       Option<String>,
}

impl NewErrorLogEntry {
  /// An entry stamped with the current UTC instant.
  pub fn now(message: impl Into<String>, trace: Option<String>) -> Self {
    Self { occurred_at: Utc::now(), message: message.into(), trace }
  }
}
