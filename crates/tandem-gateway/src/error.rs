//! Error type for `tandem-gateway`.
//!
//! Everything here is retryable from the repository's point of view: a
//! gateway failure costs one optional field of the snapshot and is surfaced
//! as `last_error`, never as a failed refresh.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport-level failure — DNS, connect, timeout, TLS, malformed body.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The backend refused our credentials for this partner.
  #[error("partner request unauthorized")]
  Unauthorized,

  #[error("partner endpoint returned HTTP {0}")]
  Status(u16),

  /// `success: false` with a reason other than the expected soft ones.
  #[error("partner backend rejected the request: {reason}")]
  Rejected { reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
