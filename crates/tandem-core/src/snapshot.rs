//! The widget snapshot — the one immutable, fully-computed state object the
//! rendering surface consumes.
//!
//! A snapshot is created only inside a repository refresh, fully replaces its
//! predecessor, and is read-only once published. Optional fields mean "not
//! computable right now", never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  distance::{DistanceSnapshot, ProximityStatus, NO_LOCATION_TEXT},
  relationship::RelationshipSnapshot,
  Result,
};

/// Fixed key the structured cache record is stored under.
pub const CACHE_KEY: &str = "widget_snapshot";

/// Bumped on any backward-incompatible change to the serialized snapshot.
pub const SCHEMA_VERSION: u32 = 1;

// ─── WidgetSnapshot ──────────────────────────────────────────────────────────

/// Everything the widget can render, merged from local user state, the
/// partner gateway, and the two calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
  pub user_name:        Option<String>,
  pub user_avatar:      Option<String>,
  pub partner_name:     Option<String>,
  pub partner_avatar:   Option<String>,
  pub has_partner:      bool,
  pub has_subscription: bool,
  pub relationship:     Option<RelationshipSnapshot>,
  pub distance:         Option<DistanceSnapshot>,
  pub computed_at:      DateTime<Utc>,
  pub schema_version:   u32,
}

impl WidgetSnapshot {
  /// The snapshot rendered before any refresh has ever succeeded, and the
  /// fallback after a corrupt cache read.
  ///
  /// Dated at the Unix epoch so it is always considered stale.
  pub fn empty() -> Self {
    Self {
      user_name:        None,
      user_avatar:      None,
      partner_name:     None,
      partner_avatar:   None,
      has_partner:      false,
      has_subscription: false,
      relationship:     None,
      distance:         None,
      computed_at:      DateTime::<Utc>::UNIX_EPOCH,
      schema_version:   SCHEMA_VERSION,
    }
  }

  /// Age of this snapshot relative to `now`. Saturates at zero for clocks
  /// that went backwards.
  pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
    (now - self.computed_at).max(chrono::Duration::zero())
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }

  /// The canonical export of the flat primitive mirror.
  ///
  /// The structured record and the mirror are both derived from this one
  /// snapshot in a single step; no other code path may write mirror keys,
  /// which is what keeps the two representations from drifting.
  pub fn mirror_entries(&self) -> Vec<(&'static str, String)> {
    let mut entries = vec![
      ("schema_version", self.schema_version.to_string()),
      ("computed_at", self.computed_at.to_rfc3339()),
      ("user_name", self.user_name.clone().unwrap_or_default()),
      ("partner_name", self.partner_name.clone().unwrap_or_default()),
      ("has_partner", self.has_partner.to_string()),
      ("has_subscription", self.has_subscription.to_string()),
    ];

    match &self.relationship {
      Some(rel) => entries.extend([
        ("days_total", rel.days_total.to_string()),
        ("months_total", rel.months_total.to_string()),
        ("years_total", rel.years_total.to_string()),
        ("duration_text", rel.formatted_duration.clone()),
        ("next_anniversary", rel.next_anniversary.to_string()),
        ("days_until_anniversary", rel.days_until_anniversary.to_string()),
        ("is_anniversary_today", rel.is_anniversary_today.to_string()),
      ]),
      None => entries.extend([
        ("days_total", String::new()),
        ("months_total", String::new()),
        ("years_total", String::new()),
        ("duration_text", String::new()),
        ("next_anniversary", String::new()),
        ("days_until_anniversary", String::new()),
        ("is_anniversary_today", false.to_string()),
      ]),
    }

    match &self.distance {
      Some(dist) => entries.extend([
        ("distance_km", format!("{:.3}", dist.distance_km)),
        ("distance_text", dist.formatted_text.clone()),
        ("distance_status", dist.status.to_string()),
        ("distance_message", dist.current_message().to_string()),
      ]),
      None => entries.extend([
        ("distance_km", String::new()),
        ("distance_text", NO_LOCATION_TEXT.to_string()),
        ("distance_status", ProximityStatus::NoLocation.to_string()),
        (
          "distance_message",
          ProximityStatus::NoLocation.message_set()[0].to_string(),
        ),
      ]),
    }

    entries
  }
}

// ─── CacheRecord ─────────────────────────────────────────────────────────────

/// A persisted snapshot plus the moment the store wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
  pub snapshot:   WidgetSnapshot,
  pub written_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
