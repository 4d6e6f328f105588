//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use personas_core::{audit::ErrorLogEntry, person::Person};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str =
  "id, first_name, last_name, birth_date, email, phone, address, registered_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:            i64,
  pub first_name:    String,
  pub last_name:     String,
  pub birth_date:    String,
  pub email:         String,
  pub phone:         Option<String>,
  pub address:       Option<String>,
  pub registered_at: String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      birth_date:    row.get(3)?,
      email:         row.get(4)?,
      phone:         row.get(5)?,
      address:       row.get(6)?,
      registered_at: row.get(7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:            self.id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      birth_date:    decode_dt(&self.birth_date)?,
      email:         self.email,
      phone:         self.phone,
      address:       self.address,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}

/// Raw values read directly from an `error_log` row.
pub struct RawErrorLogEntry {
  pub id:          i64,
  pub occurred_at: String,
  pub message:     String,
  pub trace:       Option<String>,
}

impl RawErrorLogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      occurred_at: row.get(1)?,
      message:     row.get(2)?,
      trace:       row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<ErrorLogEntry> {
    Ok(ErrorLogEntry {
      id:          self.id,
      occurred_at: decode_dt(&self.occurred_at)?,
      message:     self.message,
      trace:       self.trace,
    })
  }
}
