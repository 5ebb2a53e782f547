//! Gateway tests against a mock HTTP backend.

use std::time::Duration;

use serde_json::json;
use tandem_core::gateway::{LocationLookup, PartnerGateway};
use wiremock::{
  matchers::{header, method, path},
  Mock, MockServer, ResponseTemplate,
};

use crate::{Error, GatewayConfig, HttpPartnerGateway};

async fn gateway_for(server: &MockServer) -> HttpPartnerGateway {
  let mut config = GatewayConfig::new(server.uri());
  config.auth_token = Some("test-token".to_string());
  config.timeout = Duration::from_secs(2);
  HttpPartnerGateway::new(config).unwrap()
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_success_maps_the_dto() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42"))
    .and(header("authorization", "Bearer test-token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "partnerInfo": {
        "name": "Sam",
        "isSubscribed": true,
        "subscriptionType": "annual",
        "profileImageURL": "https://cdn.example.com/sam.png"
      }
    })))
    .mount(&server)
    .await;

  let profile = gateway_for(&server)
    .await
    .fetch_profile("p-42")
    .await
    .unwrap()
    .unwrap();

  assert_eq!(profile.name, "Sam");
  assert!(profile.is_subscribed);
  assert_eq!(profile.subscription_type.as_deref(), Some("annual"));
  assert_eq!(
    profile.avatar_url.as_deref(),
    Some("https://cdn.example.com/sam.png")
  );
}

#[tokio::test]
async fn profile_success_without_partner_is_none() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
    )
    .mount(&server)
    .await;

  let profile = gateway_for(&server).await.fetch_profile("p-42").await.unwrap();
  assert!(profile.is_none());
}

#[tokio::test]
async fn profile_401_is_unauthorized() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42"))
    .respond_with(ResponseTemplate::new(401))
    .mount(&server)
    .await;

  let err = gateway_for(&server).await.fetch_profile("p-42").await.unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn profile_500_is_a_status_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let err = gateway_for(&server).await.fetch_profile("p-42").await.unwrap_err();
  assert!(matches!(err, Error::Status(500)));
}

// ─── Location ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn location_success_maps_the_point() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42/location"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "location": {
        "latitude": 48.8566,
        "longitude": 2.3522,
        "city": "Paris",
        "country": "France"
      }
    })))
    .mount(&server)
    .await;

  let lookup = gateway_for(&server).await.fetch_location("p-42").await.unwrap();
  let LocationLookup::Located(loc) = lookup else {
    panic!("expected a located partner");
  };
  assert_eq!(loc.point.latitude, 48.8566);
  assert_eq!(loc.point.longitude, 2.3522);
  assert_eq!(loc.city.as_deref(), Some("Paris"));
  assert!(loc.address.is_none());
}

#[tokio::test]
async fn no_location_reason_is_a_soft_outcome() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42/location"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": false,
      "reason": "NO_LOCATION"
    })))
    .mount(&server)
    .await;

  let lookup = gateway_for(&server).await.fetch_location("p-42").await.unwrap();
  assert_eq!(lookup, LocationLookup::NoLocation);
}

#[tokio::test]
async fn success_without_position_is_also_soft() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42/location"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
    )
    .mount(&server)
    .await;

  let lookup = gateway_for(&server).await.fetch_location("p-42").await.unwrap();
  assert_eq!(lookup, LocationLookup::NoLocation);
}

#[tokio::test]
async fn other_rejection_reason_is_an_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42/location"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": false,
      "reason": "LINK_DISSOLVED"
    })))
    .mount(&server)
    .await;

  let err = gateway_for(&server).await.fetch_location("p-42").await.unwrap_err();
  assert!(
    matches!(&err, Error::Rejected { reason } if reason == "LINK_DISSOLVED")
  );
}

// ─── Independence ────────────────────────────────────────────────────────────

#[tokio::test]
async fn dead_location_endpoint_does_not_cost_the_profile() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "success": true,
      "partnerInfo": { "name": "Sam", "isSubscribed": false }
    })))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/partners/p-42/location"))
    .respond_with(ResponseTemplate::new(503))
    .mount(&server)
    .await;

  let gateway = gateway_for(&server).await;
  let (profile, location) = tokio::join!(
    gateway.fetch_profile("p-42"),
    gateway.fetch_location("p-42"),
  );

  assert_eq!(profile.unwrap().unwrap().name, "Sam");
  assert!(matches!(location.unwrap_err(), Error::Status(503)));
}
