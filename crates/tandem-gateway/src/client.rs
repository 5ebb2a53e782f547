//! Async HTTP client implementing [`PartnerGateway`] against the couples
//! backend.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tandem_core::{
  gateway::{LocationLookup, PartnerGateway, PartnerLocation, PartnerProfile},
  geo::GeoPoint,
};

use crate::{
  wire::{PartnerInfoResponse, PartnerLocationResponse, NO_LOCATION_REASON},
  Error, Result,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the partner API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  pub base_url:   String,
  /// Bearer token issued by the auth layer; requests go out unauthenticated
  /// when absent (test and staging backends).
  pub auth_token: Option<String>,
  /// Upper bound on any single lookup. The repository is never blocked
  /// longer than this per call.
  pub timeout:    Duration,
}

impl GatewayConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url:   base_url.into(),
      auth_token: None,
      timeout:    Duration::from_secs(10),
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP gateway for partner lookups.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPartnerGateway {
  client: Client,
  config: GatewayConfig,
}

impl HttpPartnerGateway {
  pub fn new(config: GatewayConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.config.auth_token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Map transport-level status codes shared by both lookups.
  fn check_status(status: StatusCode) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      return Err(Error::Unauthorized);
    }
    if !status.is_success() {
      return Err(Error::Status(status.as_u16()));
    }
    Ok(())
  }
}

// ─── PartnerGateway impl ─────────────────────────────────────────────────────

impl PartnerGateway for HttpPartnerGateway {
  type Error = Error;

  /// `GET /partners/{partner_id}`
  async fn fetch_profile(&self, partner_id: &str) -> Result<Option<PartnerProfile>> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/partners/{partner_id}"))))
      .send()
      .await?;
    Self::check_status(resp.status())?;

    let body: PartnerInfoResponse = resp.json().await?;
    if !body.success {
      return Err(Error::Rejected {
        reason: "partner info lookup refused".to_string(),
      });
    }

    Ok(body.partner_info.map(|info| PartnerProfile {
      name:              info.name,
      avatar_url:        info.profile_image_url,
      is_subscribed:     info.is_subscribed,
      subscription_type: info.subscription_type,
    }))
  }

  /// `GET /partners/{partner_id}/location`
  async fn fetch_location(&self, partner_id: &str) -> Result<LocationLookup> {
    let resp = self
      .auth(
        self
          .client
          .get(self.url(&format!("/partners/{partner_id}/location"))),
      )
      .send()
      .await?;
    Self::check_status(resp.status())?;

    let body: PartnerLocationResponse = resp.json().await?;

    if !body.success {
      return match body.reason.as_deref() {
        Some(NO_LOCATION_REASON) => {
          tracing::info!(partner_id, "partner shares no location");
          Ok(LocationLookup::NoLocation)
        }
        other => Err(Error::Rejected {
          reason: other.unwrap_or("unspecified").to_string(),
        }),
      };
    }

    match body.location {
      Some(loc) => Ok(LocationLookup::Located(PartnerLocation {
        point:   GeoPoint::new(loc.latitude, loc.longitude),
        address: loc.address,
        city:    loc.city,
        country: loc.country,
      })),
      None => {
        tracing::info!(partner_id, "location lookup succeeded without a position");
        Ok(LocationLookup::NoLocation)
      }
    }
  }
}
