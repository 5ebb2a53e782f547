//! Proximity snapshot — haversine distance bucketed into a status, with the
//! French message set the widget cycles through.
//!
//! The calculator is a pure function of two optional points. A missing point
//! is an expected state, not an error: the caller renders "no location".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, DistanceUnit, GeoPoint, KM_TO_MI};

/// Placeholder copy shown when no distance can be computed.
pub const NO_LOCATION_TEXT: &str = "Position inconnue";

// ─── Status buckets ──────────────────────────────────────────────────────────

/// Distance bucket. Boundaries are half-open and lower-inclusive:
/// `[0,1) [1,10) [10,100) [100,1000) [1000,∞)`.
///
/// There is no hysteresis band; a partner oscillating around a boundary
/// flickers between adjacent buckets on consecutive refreshes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProximityStatus {
  VeryClose,
  Close,
  Nearby,
  Far,
  VeryFar,
  NoLocation,
}

impl ProximityStatus {
  /// Bucket a known distance. `NoLocation` is never produced here — it is
  /// reserved for the absent-point case.
  pub fn from_km(km: f64) -> Self {
    if km < 1.0 {
      Self::VeryClose
    } else if km < 10.0 {
      Self::Close
    } else if km < 100.0 {
      Self::Nearby
    } else if km < 1000.0 {
      Self::Far
    } else {
      Self::VeryFar
    }
  }

  /// The fixed message variants the widget rotates through for this bucket.
  pub fn message_set(self) -> &'static [&'static str] {
    match self {
      Self::VeryClose => &[
        "À deux pas l'un de l'autre",
        "Vous êtes presque ensemble !",
        "Tout près, profitez-en",
        "Juste à côté",
      ],
      Self::Close => &[
        "Dans le même quartier",
        "À quelques minutes l'un de l'autre",
        "Un petit trajet et c'est gagné",
      ],
      Self::Nearby => &[
        "À moins d'une heure de route",
        "Dans la même région",
        "Un aller-retour dans la journée",
        "Pas si loin que ça",
      ],
      Self::Far => &[
        "Un train ou deux vous séparent",
        "Loin des yeux, près du cœur",
        "Chaque kilomètre compte",
      ],
      Self::VeryFar => &[
        "À l'autre bout du monde",
        "La distance n'est qu'un chiffre",
        "Sous le même ciel, malgré tout",
        "Les retrouvailles n'en seront que plus belles",
      ],
      Self::NoLocation => &[
        "Position inconnue",
        "Activez le partage de position",
        "En attente de sa position…",
      ],
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Immutable proximity snapshot. Message cycling is pure: [`advance`] returns
/// a new snapshot, there is no shared rotation state.
///
/// [`advance`]: DistanceSnapshot::advance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSnapshot {
  pub distance_km:           f64,
  pub unit:                  DistanceUnit,
  pub formatted_text:        String,
  pub status:                ProximityStatus,
  /// Ordered message variants for `status`; 3–5 entries.
  pub message_set:           Vec<String>,
  /// Always a valid index into `message_set`.
  pub current_message_index: usize,
  pub computed_at:           DateTime<Utc>,
}

impl DistanceSnapshot {
  /// Compute a proximity snapshot from two optional points.
  ///
  /// Returns `None` when either point is missing — an expected state the
  /// caller renders as "no location", never an error.
  pub fn compute(
    user:        Option<GeoPoint>,
    partner:     Option<GeoPoint>,
    unit:        DistanceUnit,
    computed_at: DateTime<Utc>,
  ) -> Option<Self> {
    let (user, partner) = (user?, partner?);
    let distance_km = haversine_km(user, partner);
    let status = ProximityStatus::from_km(distance_km);

    Some(Self {
      distance_km,
      unit,
      formatted_text: format_distance(distance_km, unit),
      status,
      message_set: status.message_set().iter().map(|s| s.to_string()).collect(),
      current_message_index: 0,
      computed_at,
    })
  }

  /// The message currently shown by the widget.
  pub fn current_message(&self) -> &str {
    self
      .message_set
      .get(self.current_message_index)
      .map(String::as_str)
      .unwrap_or(NO_LOCATION_TEXT)
  }

  /// Pure rotation: a new snapshot pointing at the next message, wrapping
  /// at the end of the set.
  pub fn advance(&self) -> Self {
    let len = self.message_set.len().max(1);
    Self {
      current_message_index: (self.current_message_index + 1) % len,
      ..self.clone()
    }
  }

  /// Carry message rotation across refreshes: if `previous` sat in the same
  /// status bucket, continue its cycle one step further; otherwise start the
  /// new bucket's set from the beginning.
  pub fn continuing_from(self, previous: Option<&Self>) -> Self {
    match previous {
      Some(prev) if prev.status == self.status => {
        let len = self.message_set.len().max(1);
        Self {
          current_message_index: (prev.current_message_index + 1) % len,
          ..self
        }
      }
      _ => self,
    }
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Human distance formatting.
///
/// KM: `<1 km` → integer metres; `[1,10)` → one decimal; `≥10` → integer.
/// MI: `<0.1 mi` → integer feet; `<10 mi` → one decimal; else integer.
pub fn format_distance(km: f64, unit: DistanceUnit) -> String {
  match unit {
    DistanceUnit::Km => {
      if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
      } else if km < 10.0 {
        format!("{km:.1} km")
      } else {
        format!("{} km", km.round() as i64)
      }
    }
    DistanceUnit::Mi => {
      let mi = km * KM_TO_MI;
      if mi < 0.1 {
        format!("{} ft", (mi * 5280.0).round() as i64)
      } else if mi < 10.0 {
        format!("{mi:.1} mi")
      } else {
        format!("{} mi", mi.round() as i64)
      }
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  const PARIS:  GeoPoint = GeoPoint { latitude: 48.8566, longitude: 2.3522 };
  const LONDON: GeoPoint = GeoPoint { latitude: 51.5074, longitude: -0.1278 };

  fn at() -> DateTime<Utc> {
    "2024-06-01T12:00:00Z".parse().unwrap()
  }

  // ── Buckets ───────────────────────────────────────────────────────────────

  #[test]
  fn bucket_boundaries_are_lower_inclusive() {
    assert_eq!(ProximityStatus::from_km(0.0), ProximityStatus::VeryClose);
    assert_eq!(ProximityStatus::from_km(0.999), ProximityStatus::VeryClose);
    assert_eq!(ProximityStatus::from_km(1.0), ProximityStatus::Close);
    assert_eq!(ProximityStatus::from_km(9.999), ProximityStatus::Close);
    assert_eq!(ProximityStatus::from_km(10.0), ProximityStatus::Nearby);
    assert_eq!(ProximityStatus::from_km(100.0), ProximityStatus::Far);
    assert_eq!(ProximityStatus::from_km(999.999), ProximityStatus::Far);
    assert_eq!(ProximityStatus::from_km(1000.0), ProximityStatus::VeryFar);
  }

  #[test]
  fn every_bucket_has_three_to_five_messages() {
    for status in ProximityStatus::iter() {
      let set = status.message_set();
      assert!(
        (3..=5).contains(&set.len()),
        "{status} has {} messages",
        set.len()
      );
    }
  }

  // ── Compute ───────────────────────────────────────────────────────────────

  #[test]
  fn missing_point_yields_none() {
    assert!(
      DistanceSnapshot::compute(None, Some(PARIS), DistanceUnit::Km, at())
        .is_none()
    );
    assert!(
      DistanceSnapshot::compute(Some(PARIS), None, DistanceUnit::Km, at())
        .is_none()
    );
    assert!(
      DistanceSnapshot::compute(None, None, DistanceUnit::Km, at()).is_none()
    );
  }

  #[test]
  fn paris_london_is_far() {
    let snap =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap();
    assert!((343.0..345.0).contains(&snap.distance_km), "{}", snap.distance_km);
    assert_eq!(snap.status, ProximityStatus::Far);
    assert_eq!(snap.formatted_text, "344 km");
    assert_eq!(snap.current_message_index, 0);
    assert_eq!(snap.message_set.len(), 3);
  }

  // ── Advance ───────────────────────────────────────────────────────────────

  #[test]
  fn advance_is_cyclic() {
    let snap =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap();

    let mut rotated = snap.clone();
    for _ in 0..snap.message_set.len() {
      rotated = rotated.advance();
    }
    assert_eq!(rotated.current_message_index, snap.current_message_index);
  }

  #[test]
  fn advance_steps_through_every_message() {
    let snap =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap();

    let mut seen = vec![snap.current_message().to_string()];
    let mut cur = snap.clone();
    for _ in 1..snap.message_set.len() {
      cur = cur.advance();
      seen.push(cur.current_message().to_string());
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), snap.message_set.len());
  }

  #[test]
  fn continuing_from_same_bucket_advances_index() {
    let prev =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap();
    let next =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap()
        .continuing_from(Some(&prev));
    assert_eq!(next.current_message_index, 1);
  }

  #[test]
  fn continuing_from_other_bucket_resets_index() {
    let prev =
      DistanceSnapshot::compute(Some(PARIS), Some(LONDON), DistanceUnit::Km, at())
        .unwrap()
        .advance();
    let near = GeoPoint::new(48.8570, 2.3530);
    let next =
      DistanceSnapshot::compute(Some(PARIS), Some(near), DistanceUnit::Km, at())
        .unwrap()
        .continuing_from(Some(&prev));
    assert_eq!(next.status, ProximityStatus::VeryClose);
    assert_eq!(next.current_message_index, 0);
  }

  // ── Formatting ────────────────────────────────────────────────────────────

  #[test]
  fn km_formatting_rules() {
    assert_eq!(format_distance(0.5, DistanceUnit::Km), "500 m");
    assert_eq!(format_distance(5.0, DistanceUnit::Km), "5.0 km");
    assert_eq!(format_distance(9.95, DistanceUnit::Km), "9.9 km");
    assert_eq!(format_distance(50.0, DistanceUnit::Km), "50 km");
    assert_eq!(format_distance(1234.4, DistanceUnit::Km), "1234 km");
  }

  #[test]
  fn mi_formatting_rules() {
    // 0.1 km = 0.0621 mi → feet
    assert_eq!(format_distance(0.1, DistanceUnit::Mi), "328 ft");
    // 5 km = 3.1069 mi → one decimal
    assert_eq!(format_distance(5.0, DistanceUnit::Mi), "3.1 mi");
    // 50 km = 31.07 mi → integer
    assert_eq!(format_distance(50.0, DistanceUnit::Mi), "31 mi");
  }
}
