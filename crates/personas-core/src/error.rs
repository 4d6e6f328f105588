//! Error types for `personas-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown search field: {0:?}")]
  UnknownSearchField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
