//! Geographic primitives — WGS-84 points and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres → statute miles.
pub const KM_TO_MI: f64 = 0.621371;

// ─── GeoPoint ────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

impl GeoPoint {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }
}

// ─── Unit ────────────────────────────────────────────────────────────────────

/// Display unit for formatted distances.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
  #[default]
  Km,
  Mi,
}

// ─── Haversine ───────────────────────────────────────────────────────────────

/// Great-circle distance between two points, in kilometres.
///
/// Symmetric, and zero for identical points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
  let lat_a = a.latitude.to_radians();
  let lat_b = b.latitude.to_radians();
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lon = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

  2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
