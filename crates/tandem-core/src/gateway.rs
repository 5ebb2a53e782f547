//! The partner gateway seam — two independent secure remote lookups.
//!
//! Implemented over HTTPS by `tandem-gateway`. Higher layers depend on this
//! abstraction, not on any concrete transport.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

// ─── Lookup results ──────────────────────────────────────────────────────────

/// The partner's public profile as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerProfile {
  pub name:              String,
  pub avatar_url:        Option<String>,
  pub is_subscribed:     bool,
  pub subscription_type: Option<String>,
}

/// A located partner, with whatever reverse-geocoding the backend attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerLocation {
  pub point:   GeoPoint,
  pub address: Option<String>,
  pub city:    Option<String>,
  pub country: Option<String>,
}

/// Outcome of a location lookup that *succeeded* at the transport level.
///
/// "The partner shares no location" is an expected state distinct from a
/// failed call; it is logged at info level and never treated as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationLookup {
  Located(PartnerLocation),
  NoLocation,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Two independent remote reads, issued in parallel by the repository.
///
/// Contract: side-effect-free, bounded timeout, and the two lookups never
/// fail each other — a dead location endpoint must not cost the caller the
/// profile, and vice versa. Transport failures are retryable.
pub trait PartnerGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the partner's profile. `Ok(None)` means the backend knows no
  /// such partner (e.g. the link was dissolved remotely).
  fn fetch_profile<'a>(
    &'a self,
    partner_id: &'a str,
  ) -> impl Future<Output = Result<Option<PartnerProfile>, Self::Error>> + Send + 'a;

  /// Fetch the partner's last shared location.
  fn fetch_location<'a>(
    &'a self,
    partner_id: &'a str,
  ) -> impl Future<Output = Result<LocationLookup, Self::Error>> + Send + 'a;
}
