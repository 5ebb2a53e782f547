//! [`WidgetDataRepository`] — cache-first source of truth for the widget
//! snapshot.
//!
//! Reads never block and never touch the network; refreshes are
//! single-flight and tolerate partial failure of every optional subsystem.
//! Whatever happens, the repository always publishes *some* valid,
//! internally-consistent snapshot.

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use tandem_core::{
  distance::DistanceSnapshot,
  gateway::{LocationLookup, PartnerGateway, PartnerProfile},
  relationship::RelationshipSnapshot,
  snapshot::{WidgetSnapshot, SCHEMA_VERSION},
  state::UserStateSource,
  store::SnapshotStore,
};

use crate::error::{RefreshError, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RepositoryConfig {
  /// A snapshot younger than this satisfies an unforced refresh without any
  /// remote traffic.
  pub staleness: Duration,
}

impl Default for RepositoryConfig {
  fn default() -> Self {
    Self { staleness: Duration::from_secs(15 * 60) }
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// Process-local orchestrator and single writer of the snapshot cache.
///
/// All widget consumers in one process share a single instance behind an
/// `Arc` to avoid duplicate network traffic.
pub struct WidgetDataRepository<S, G, U> {
  store:         Arc<S>,
  gateway:       Arc<G>,
  user_state:    Arc<U>,
  config:        RepositoryConfig,
  /// Latest published snapshot; the channel gives subscribers
  /// replay-latest-value-of-1 semantics, and dropping a receiver is the
  /// unsubscribe.
  current:       watch::Sender<WidgetSnapshot>,
  /// Serialises refreshes; waiters attach to the in-flight result.
  refresh_lock:  tokio::sync::Mutex<()>,
  is_refreshing: AtomicBool,
  last_error:    Mutex<Option<String>>,
}

impl<S, G, U> WidgetDataRepository<S, G, U>
where
  S: SnapshotStore,
  G: PartnerGateway,
  U: UserStateSource,
{
  /// Build a repository, seeding the in-memory snapshot from the cache.
  ///
  /// A missing record is first-run; a corrupt or unreadable one is logged
  /// and replaced by the empty snapshot. Neither fails construction — the
  /// renderer must always have something to read.
  pub async fn open(
    store:      Arc<S>,
    gateway:    Arc<G>,
    user_state: Arc<U>,
    config:     RepositoryConfig,
  ) -> Self {
    let initial = match store.load().await {
      Ok(Some(record)) => record.snapshot,
      Ok(None) => WidgetSnapshot::empty(),
      Err(e) => {
        tracing::warn!(error = %e, "cache unreadable; starting from the empty snapshot");
        WidgetSnapshot::empty()
      }
    };

    let (current, _) = watch::channel(initial);

    Self {
      store,
      gateway,
      user_state,
      config,
      current,
      refresh_lock: tokio::sync::Mutex::new(()),
      is_refreshing: AtomicBool::new(false),
      last_error: Mutex::new(None),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The last known snapshot, possibly stale. Never blocks, never touches
  /// remote services.
  pub fn current(&self) -> WidgetSnapshot {
    self.current.borrow().clone()
  }

  /// Subscribe to snapshot publications. The receiver immediately holds the
  /// latest value; dropping it unsubscribes.
  pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
    self.current.subscribe()
  }

  /// Whether a refresh is in flight right now.
  pub fn is_refreshing(&self) -> bool {
    self.is_refreshing.load(Ordering::Relaxed)
  }

  /// The most recent non-fatal failure (gateway, cache write), cleared by
  /// the next fully-clean refresh.
  pub fn last_error(&self) -> Option<String> {
    self.last_error.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  // ── Refresh ───────────────────────────────────────────────────────────────

  /// Recompute, persist, and publish a new snapshot.
  ///
  /// Unforced calls are satisfied from the cache while the current snapshot
  /// is younger than the staleness threshold. Concurrent calls are
  /// single-flight: whoever holds the lock fans out once, and every waiter
  /// that observes a snapshot computed after its own call began returns it
  /// without touching the gateway again.
  pub async fn refresh(&self, force: bool) -> Result<WidgetSnapshot> {
    let requested_at = Utc::now();

    if !force && self.is_fresh(requested_at) {
      tracing::debug!("refresh satisfied from cache");
      return Ok(self.current());
    }

    let _guard = self.refresh_lock.lock().await;

    // A refresh that completed while we waited on the lock is our result.
    let current = self.current();
    if current.computed_at >= requested_at {
      return Ok(current);
    }
    if !force && self.is_fresh(requested_at) {
      return Ok(current);
    }

    self.is_refreshing.store(true, Ordering::Relaxed);
    let result = self.run_refresh().await;
    self.is_refreshing.store(false, Ordering::Relaxed);
    result
  }

  fn is_fresh(&self, now: DateTime<Utc>) -> bool {
    let staleness = chrono::Duration::from_std(self.config.staleness)
      .unwrap_or(chrono::Duration::MAX);
    self.current.borrow().age(now) < staleness
  }

  /// One full fan-out → merge → persist → publish cycle. Only a missing
  /// user state aborts; everything else degrades field by field.
  async fn run_refresh(&self) -> Result<WidgetSnapshot> {
    let refresh_id = Uuid::new_v4();
    let mut warnings: Vec<String> = Vec::new();

    let user = self
      .user_state
      .load()
      .await
      .map_err(|e| RefreshError::UserState(Box::new(e)))?;

    let previous = self.current();

    // The two gateway lookups run in parallel and fail independently.
    let (profile, partner_location) = match user.partner_id.as_deref() {
      Some(partner_id) => {
        let (profile_res, location_res) = tokio::join!(
          self.gateway.fetch_profile(partner_id),
          self.gateway.fetch_location(partner_id),
        );

        let profile: Option<PartnerProfile> = match profile_res {
          Ok(found) => found,
          Err(e) => {
            tracing::warn!(%refresh_id, error = %e, "partner profile lookup failed");
            warnings.push(format!("partner profile: {e}"));
            None
          }
        };

        let partner_location = match location_res {
          Ok(LocationLookup::Located(loc)) => Some(loc.point),
          Ok(LocationLookup::NoLocation) => {
            tracing::info!(%refresh_id, "partner location not shared");
            None
          }
          Err(e) => {
            tracing::warn!(%refresh_id, error = %e, "partner location lookup failed");
            warnings.push(format!("partner location: {e}"));
            None
          }
        };

        (profile, partner_location)
      }
      None => (None, None),
    };

    // The snapshot is stamped at merge time, after the fan-out: a caller
    // that requested a refresh while this one was in flight sees
    // `computed_at >= its own request time` and attaches instead of
    // fanning out again.
    let computed_at = Utc::now();

    // Calculators. An invalid start date fails only the relationship field.
    let today = computed_at.date_naive();
    let relationship = user.relationship_start.and_then(|start| {
      match RelationshipSnapshot::compute(start, today, computed_at) {
        Ok(snap) => Some(snap),
        Err(e) => {
          tracing::warn!(%refresh_id, error = %e, "relationship field skipped");
          warnings.push(e.to_string());
          None
        }
      }
    });

    let distance = DistanceSnapshot::compute(
      user.location,
      partner_location,
      user.unit,
      computed_at,
    )
    .map(|snap| snap.continuing_from(previous.distance.as_ref()));

    let snapshot = WidgetSnapshot {
      user_name: user.user_name,
      user_avatar: user.user_avatar,
      partner_name: profile.as_ref().map(|p| p.name.clone()),
      partner_avatar: profile.as_ref().and_then(|p| p.avatar_url.clone()),
      has_partner: profile.is_some(),
      has_subscription: user.has_subscription
        || profile.as_ref().is_some_and(|p| p.is_subscribed),
      relationship,
      distance,
      computed_at,
      schema_version: SCHEMA_VERSION,
    };

    // Persist atomically. A failed write keeps the previous durable record
    // (stale but consistent); the fresh snapshot is still published.
    if let Err(e) = self.store.save(&snapshot).await {
      tracing::error!(%refresh_id, error = %e, "cache write failed");
      warnings.push(format!("cache write: {e}"));
    }

    *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) =
      warnings.last().cloned();

    self.current.send_replace(snapshot.clone());
    tracing::debug!(
      %refresh_id,
      has_partner = snapshot.has_partner,
      has_distance = snapshot.distance.is_some(),
      warnings = warnings.len(),
      "snapshot published"
    );

    Ok(snapshot)
  }
}
