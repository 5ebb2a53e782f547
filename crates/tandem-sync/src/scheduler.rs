//! [`RefreshScheduler`] — the thin executor around the pure schedule policy.
//!
//! The loop does nothing clever: refresh, ask [`SchedulePolicy`] how long to
//! sleep, sleep, repeat. Constraint checks gate each tick (a skip is not a
//! failure), a per-tick timeout bounds each refresh, and consecutive
//! failures stretch the cadence through the policy's bounded backoff.
//!
//! The lifecycle is reference-counted on widget instances: the first
//! attached widget starts the loop, the last detached one stops it.

use std::sync::{
  atomic::{AtomicU32, AtomicUsize, Ordering},
  Arc, Mutex,
};

use tandem_core::{schedule::SchedulePolicy, snapshot::WidgetSnapshot};
use tokio::task::JoinHandle;

use crate::error::{RefreshError, Result};

// ─── Seams ───────────────────────────────────────────────────────────────────

/// What the scheduler needs from the repository. A trait so the loop is
/// testable against counting fakes.
pub trait RefreshDriver: Send + Sync {
  /// A forced refresh — scheduler ticks always bypass the staleness gate.
  fn refresh_now(
    &self,
  ) -> impl Future<Output = Result<WidgetSnapshot>> + Send + '_;
}

impl<S, G, U> RefreshDriver for crate::WidgetDataRepository<S, G, U>
where
  S: tandem_core::store::SnapshotStore,
  G: tandem_core::gateway::PartnerGateway,
  U: tandem_core::state::UserStateSource,
{
  async fn refresh_now(&self) -> Result<WidgetSnapshot> {
    self.refresh(true).await
  }
}

/// Host-platform constraints on background work (network reachability,
/// battery). An unmet constraint skips the tick; it is never a failure.
pub trait ConstraintProbe: Send + Sync {
  fn constraints_met(&self) -> bool;
}

/// Probe for hosts without meaningful constraints (servers, tests).
pub struct NoConstraints;

impl ConstraintProbe for NoConstraints {
  fn constraints_met(&self) -> bool {
    true
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
  pub policy:       SchedulePolicy,
  /// Budget for one scheduler-driven refresh; on expiry the operation is
  /// abandoned and counted as a retryable failure.
  pub tick_timeout: std::time::Duration,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      policy:       SchedulePolicy::default(),
      tick_timeout: std::time::Duration::from_secs(60),
    }
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// Shared between the scheduler handle and its loop task.
struct SchedulerShared {
  consecutive_failures: AtomicU32,
  last_error:           Mutex<Option<String>>,
}

/// Adaptive background driver of a [`RefreshDriver`].
pub struct RefreshScheduler<R, P> {
  driver:         Arc<R>,
  probe:          Arc<P>,
  config:         SchedulerConfig,
  active_widgets: AtomicUsize,
  shared:         Arc<SchedulerShared>,
  handle:         Mutex<Option<JoinHandle<()>>>,
}

impl<R, P> RefreshScheduler<R, P>
where
  R: RefreshDriver + 'static,
  P: ConstraintProbe + 'static,
{
  pub fn new(driver: Arc<R>, probe: Arc<P>, config: SchedulerConfig) -> Self {
    Self {
      driver,
      probe,
      config,
      active_widgets: AtomicUsize::new(0),
      shared: Arc::new(SchedulerShared {
        consecutive_failures: AtomicU32::new(0),
        last_error:           Mutex::new(None),
      }),
      handle: Mutex::new(None),
    }
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// A widget instance appeared. The first one starts the loop, which
  /// refreshes immediately. Returns the new instance count.
  pub fn widget_attached(&self) -> usize {
    let previous = self.active_widgets.fetch_add(1, Ordering::SeqCst);
    if previous == 0 {
      self.start();
    }
    previous + 1
  }

  /// A widget instance was removed. The last one stops the loop. Returns
  /// the remaining instance count.
  pub fn widget_detached(&self) -> usize {
    let previous = self
      .active_widgets
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .unwrap_or(0);
    let remaining = previous.saturating_sub(1);
    if previous == 1 {
      self.stop();
    }
    remaining
  }

  pub fn active_widgets(&self) -> usize {
    self.active_widgets.load(Ordering::SeqCst)
  }

  pub fn is_running(&self) -> bool {
    self
      .handle
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .as_ref()
      .is_some_and(|h| !h.is_finished())
  }

  /// The last tick failure, if the most recent tick failed.
  pub fn last_error(&self) -> Option<String> {
    self
      .shared
      .last_error
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }

  fn start(&self) {
    let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
    if handle.as_ref().is_some_and(|h| !h.is_finished()) {
      return;
    }
    tracing::info!("refresh scheduler started");
    *handle = Some(tokio::spawn(run_loop(
      self.driver.clone(),
      self.probe.clone(),
      self.config.clone(),
      self.shared.clone(),
    )));
  }

  fn stop(&self) {
    if let Some(handle) =
      self.handle.lock().unwrap_or_else(|e| e.into_inner()).take()
    {
      handle.abort();
      tracing::info!("refresh scheduler stopped");
    }
  }
}

impl<R, P> Drop for RefreshScheduler<R, P> {
  fn drop(&mut self) {
    if let Some(handle) =
      self.handle.lock().unwrap_or_else(|e| e.into_inner()).take()
    {
      handle.abort();
    }
  }
}

// ─── Loop ────────────────────────────────────────────────────────────────────

async fn run_loop<R, P>(
  driver: Arc<R>,
  probe:  Arc<P>,
  config: SchedulerConfig,
  shared: Arc<SchedulerShared>,
) where
  R: RefreshDriver,
  P: ConstraintProbe,
{
  // The first tick fires immediately: the widget that started the loop has
  // nothing to show yet.
  let mut interval = config.policy.base;

  loop {
    if !probe.constraints_met() {
      // Skipped, not failed: retry at the next slot on the same cadence.
      tracing::debug!("tick skipped: constraints unmet");
    } else {
      interval = match tick(&*driver, &config).await {
        Ok(snapshot) => {
          let previous =
            shared.consecutive_failures.swap(0, Ordering::Relaxed);
          if previous > 0 {
            tracing::info!(recovered_after = previous, "refresh recovered");
          }
          *shared.last_error.lock().unwrap_or_else(|e| e.into_inner()) = None;
          config.policy.decide(&snapshot)
        }
        Err(e) => {
          let failures =
            shared.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
          tracing::warn!(
            error = %e,
            consecutive_failures = failures,
            "scheduled refresh failed; backing off"
          );
          *shared.last_error.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(e.to_string());
          config.policy.backoff(failures)
        }
      };
    }

    tokio::time::sleep(interval).await;
  }
}

/// One bounded refresh attempt. On timeout the refresh future is dropped,
/// abandoning its outstanding remote calls.
async fn tick<R: RefreshDriver>(
  driver: &R,
  config: &SchedulerConfig,
) -> Result<WidgetSnapshot> {
  match tokio::time::timeout(config.tick_timeout, driver.refresh_now()).await {
    Ok(result) => result,
    Err(_) => Err(RefreshError::Timeout(config.tick_timeout)),
  }
}
