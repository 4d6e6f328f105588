//! [`SqliteStore`], the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use personas_core::{
  audit::{ErrorLogEntry, NewErrorLogEntry},
  person::{NewPerson, Person, PersonId},
  search::SearchField,
  store::PersonStore,
};

use crate::{
  Result,
  encode::{PERSON_COLUMNS, RawErrorLogEntry, RawPerson, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Personas store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_all(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  // ── Persons: reads ────────────────────────────────────────────────────────

  async fn list_persons(&self) -> Result<Vec<Person>> { self.fetch_all().await }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn person_exists(&self, id: PersonId) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM persons WHERE id = ?1",
            rusqlite::params![id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(exists)
  }

  async fn search_persons(
    &self,
    field:  SearchField,
    needle: &str,
  ) -> Result<Vec<Person>> {
    // SQLite's LIKE and lower() only fold ASCII, so the match runs here.
    let needle = needle.to_lowercase();
    let mut persons = self.fetch_all().await?;
    persons.retain(|p| field.matches(p, &needle));
    Ok(persons)
  }

  // ── Persons: writes ───────────────────────────────────────────────────────

  async fn insert_person(
    &self,
    input:         NewPerson,
    registered_at: DateTime<Utc>,
  ) -> Result<Person> {
    let first_name     = input.first_name.clone();
    let last_name      = input.last_name.clone();
    let birth_date_str = encode_dt(input.birth_date);
    let email          = input.email.clone();
    let phone          = input.phone.clone();
    let address        = input.address.clone();
    let registered_str = encode_dt(registered_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             first_name, last_name, birth_date, email, phone, address, registered_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            first_name,
            last_name,
            birth_date_str,
            email,
            phone,
            address,
            registered_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(input.into_person(id, registered_at))
  }

  async fn replace_person(
    &self,
    id:    PersonId,
    input: NewPerson,
  ) -> Result<Option<Person>> {
    let birth_date_str = encode_dt(input.birth_date);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE persons
              SET first_name = ?1, last_name = ?2, birth_date = ?3,
                  email = ?4, phone = ?5, address = ?6
            WHERE id = ?7",
          rusqlite::params![
            input.first_name,
            input.last_name,
            birth_date_str,
            input.email,
            input.phone,
            input.address,
            id,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete_person(&self, id: PersonId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Error log ─────────────────────────────────────────────────────────────

  async fn append_error(&self, entry: NewErrorLogEntry) -> Result<ErrorLogEntry> {
    let at_str  = encode_dt(entry.occurred_at);
    let message = entry.message.clone();
    let trace   = entry.trace.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO error_log (occurred_at, message, trace) VALUES (?1, ?2, ?3)",
          rusqlite::params![at_str, message, trace],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ErrorLogEntry {
      id,
      occurred_at: entry.occurred_at,
      message: entry.message,
      trace: entry.trace,
    })
  }

  async fn list_error_log(&self) -> Result<Vec<ErrorLogEntry>> {
    let raws: Vec<RawErrorLogEntry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT id, occurred_at, message, trace FROM error_log ORDER BY id")?;
        let rows = stmt
          .query_map([], RawErrorLogEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawErrorLogEntry::into_entry).collect()
  }
}
