//! File-backed [`UserStateSource`] — the daemon's integration point with the
//! host app.
//!
//! Onboarding and the account screens maintain a JSON document; the pipeline
//! only ever reads it. A missing file means onboarding has not completed
//! yet, which is an empty state, not an error.

use std::path::PathBuf;

use tandem_core::state::{UserState, UserStateSource};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserStateError {
  #[error("reading user state {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("parsing user state {path}: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Reads [`UserState`] from a JSON file on every load, so edits by the host
/// app are picked up by the next refresh without any signalling.
pub struct FileUserState {
  path: PathBuf,
}

impl FileUserState {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl UserStateSource for FileUserState {
  type Error = UserStateError;

  async fn load(&self) -> Result<UserState, Self::Error> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        tracing::debug!(path = %self.path.display(), "no user state yet");
        return Ok(UserState::default());
      }
      Err(source) => {
        return Err(UserStateError::Io { path: self.path.clone(), source });
      }
    };

    serde_json::from_str(&raw)
      .map_err(|source| UserStateError::Parse { path: self.path.clone(), source })
  }
}
