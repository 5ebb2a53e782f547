//! Local user state — the external collaborator the repository merges with
//! remote partner data.
//!
//! The pipeline does not own this data; onboarding and the account screens
//! maintain it. It is read fresh at the start of every refresh.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::{DistanceUnit, GeoPoint};

/// Everything the local app knows about its own user that the widget needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
  pub user_name:          Option<String>,
  pub user_avatar:        Option<String>,
  /// Opaque identifier of the linked partner account, if any.
  pub partner_id:         Option<String>,
  pub relationship_start: Option<NaiveDate>,
  /// Last known own location, as reported by the host platform.
  pub location:           Option<GeoPoint>,
  #[serde(default)]
  pub unit:               DistanceUnit,
  #[serde(default)]
  pub has_subscription:   bool,
}

/// Source of the local [`UserState`].
///
/// Implemented by the host integration (`tandem-server` reads a JSON
/// document the app maintains); tests use in-memory fakes.
pub trait UserStateSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn load(
    &self,
  ) -> impl Future<Output = Result<UserState, Self::Error>> + Send + '_;
}
