//! Error type for `tandem-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The persisted payload no longer deserializes. Callers recover by
  /// resetting to the empty snapshot; the next successful refresh rewrites
  /// the record.
  #[error("corrupt cache record: {0}")]
  Corrupt(String),
}

impl Error {
  pub fn is_corrupt(&self) -> bool {
    matches!(self, Self::Corrupt(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
