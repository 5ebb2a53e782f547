//! Refresh scheduling as a pure decision function.
//!
//! The adaptive logic lives here, independently testable; the thin tokio
//! executor in `tandem-sync` only sleeps for whatever this module decides.

use std::time::Duration;

use crate::{distance::ProximityStatus, snapshot::WidgetSnapshot};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Intervals and backoff bounds driving the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
  /// Cadence when nothing salient is happening.
  pub base:        Duration,
  /// Cadence when the snapshot is salient (imminent anniversary, partner
  /// very close).
  pub fast:        Duration,
  /// Ceiling for exponential backoff.
  pub backoff_cap: Duration,
  /// Failures beyond this exponent stop escalating; the cadence reverts to
  /// `base` while the last error stays surfaced.
  pub max_backoff_exponent: u32,
}

impl Default for SchedulePolicy {
  fn default() -> Self {
    Self {
      base:                 Duration::from_secs(30 * 60),
      fast:                 Duration::from_secs(15 * 60),
      backoff_cap:          Duration::from_secs(4 * 60 * 60),
      max_backoff_exponent: 5,
    }
  }
}

impl SchedulePolicy {
  /// Whether `snapshot` warrants the fast cadence.
  ///
  /// Salient: the anniversary is today or tomorrow, or the partner is in
  /// the very-close bucket.
  pub fn is_salient(&self, snapshot: &WidgetSnapshot) -> bool {
    let anniversary_imminent = snapshot
      .relationship
      .as_ref()
      .is_some_and(|rel| rel.days_until_anniversary <= 1);
    let partner_very_close = snapshot
      .distance
      .as_ref()
      .is_some_and(|dist| dist.status == ProximityStatus::VeryClose);

    anniversary_imminent || partner_very_close
  }

  /// The interval until the next tick after a successful refresh.
  pub fn decide(&self, snapshot: &WidgetSnapshot) -> Duration {
    if self.is_salient(snapshot) { self.fast } else { self.base }
  }

  /// The interval until the next attempt after `consecutive_failures`
  /// failed refreshes: `base * 2^min(n, cap_exp)`, clamped to the ceiling.
  /// Past the exponent cap the cadence reverts to `base`.
  pub fn backoff(&self, consecutive_failures: u32) -> Duration {
    if consecutive_failures == 0 || consecutive_failures > self.max_backoff_exponent
    {
      return self.base;
    }
    (self.base * 2u32.pow(consecutive_failures)).min(self.backoff_cap)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
