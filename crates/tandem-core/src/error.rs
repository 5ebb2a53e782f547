//! Error types for `tandem-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The relationship start date lies in the future — the one hard,
  /// field-local failure a calculator can produce. All expected
  /// missing-data cases are `Option`s, not errors.
  #[error("relationship start date {start} is after today ({today})")]
  InvalidStartDate { start: NaiveDate, today: NaiveDate },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
