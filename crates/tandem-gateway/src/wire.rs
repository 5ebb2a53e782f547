//! Wire format of the couples backend — kept separate from the domain types
//! in `tandem-core` so transport quirks (camelCase, `success` envelopes)
//! never leak past this crate.

use serde::Deserialize;

/// `reason` value marking a partner who shares no location — an expected
/// state, not a failure.
pub const NO_LOCATION_REASON: &str = "NO_LOCATION";

// ─── getPartnerInfo ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfoResponse {
  pub success:      bool,
  pub partner_info: Option<PartnerInfoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfoDto {
  pub name:              String,
  pub is_subscribed:     bool,
  pub subscription_type: Option<String>,
  #[serde(rename = "profileImageURL")]
  pub profile_image_url: Option<String>,
}

// ─── getPartnerLocation ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLocationResponse {
  pub success:  bool,
  pub reason:   Option<String>,
  pub location: Option<LocationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
  pub latitude:  f64,
  pub longitude: f64,
  pub address:   Option<String>,
  pub city:      Option<String>,
  pub country:   Option<String>,
}
