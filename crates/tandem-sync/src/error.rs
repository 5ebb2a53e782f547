//! Error type for `tandem-sync`.
//!
//! Only failures that prevent producing *any* snapshot surface here. A
//! failed gateway lookup or cache write degrades the snapshot instead and is
//! reported through `last_error`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
  /// Local user state could not be read — without it nothing can be merged.
  #[error("user state unavailable: {0}")]
  UserState(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A scheduler-driven refresh exceeded its tick budget and was abandoned.
  /// Retryable; the in-flight remote calls are dropped best-effort.
  #[error("refresh timed out after {0:?}")]
  Timeout(Duration),
}

pub type Result<T, E = RefreshError> = std::result::Result<T, E>;
