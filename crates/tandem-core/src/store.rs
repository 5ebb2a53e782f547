//! The snapshot store seam.
//!
//! The trait is implemented by storage backends (`tandem-store-sqlite`).
//! The repository depends on this abstraction, not on any concrete backend.

use crate::snapshot::{CacheRecord, WidgetSnapshot};

/// Durable, atomic persistence of the last computed snapshot.
///
/// The persisted record is the cross-process boundary: exactly one writer
/// (the repository) and any number of renderer-side readers, which may see a
/// slightly stale but always internally-consistent record.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the last persisted record. `Ok(None)` on first run. A corrupt
  /// payload is an error the caller recovers from by falling back to
  /// [`WidgetSnapshot::empty`].
  fn load(
    &self,
  ) -> impl Future<Output = Result<Option<CacheRecord>, Self::Error>> + Send + '_;

  /// Atomically replace the persisted record — the structured payload and
  /// its flat mirror together, in one transaction. Readers never observe a
  /// half-written state.
  fn save<'a>(
    &'a self,
    snapshot: &'a WidgetSnapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
