//! Loopback HTTP surface for the Tandem widget pipeline.
//!
//! The host app and widget host signal refresh triggers over this surface;
//! renderer processes read the SQLite cache file directly and only consult
//! `/snapshot` when they live in the daemon's process. Transport security is
//! the deployment's concern — the daemon binds to loopback.

pub mod error;
pub mod handlers;
pub mod user_state;

pub use error::ApiError;
pub use user_state::FileUserState;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  routing::{get, post},
  Router,
};
use serde::Deserialize;
use tandem_core::schedule::SchedulePolicy;
use tandem_gateway::HttpPartnerGateway;
use tandem_store_sqlite::SqliteSnapshotStore;
use tandem_sync::{
  NoConstraints, RefreshScheduler, RepositoryConfig, SchedulerConfig,
  WidgetDataRepository,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime daemon configuration, deserialised from `widgetd.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,

  /// SQLite cache file — the cross-process boundary to renderers.
  pub store_path:      PathBuf,
  /// JSON document maintained by the host app.
  pub user_state_path: PathBuf,

  pub partner_api_url:   String,
  pub partner_api_token: Option<String>,
  #[serde(default = "default_gateway_timeout_secs")]
  pub gateway_timeout_secs: u64,

  #[serde(default = "default_staleness_minutes")]
  pub staleness_minutes: u64,
  #[serde(default = "default_base_interval_minutes")]
  pub base_interval_minutes: u64,
  #[serde(default = "default_fast_interval_minutes")]
  pub fast_interval_minutes: u64,
  #[serde(default = "default_tick_timeout_secs")]
  pub tick_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 7420 }
fn default_gateway_timeout_secs() -> u64 { 10 }
fn default_staleness_minutes() -> u64 { 15 }
fn default_base_interval_minutes() -> u64 { 30 }
fn default_fast_interval_minutes() -> u64 { 15 }
fn default_tick_timeout_secs() -> u64 { 60 }

impl ServerConfig {
  pub fn repository_config(&self) -> RepositoryConfig {
    RepositoryConfig {
      staleness: Duration::from_secs(self.staleness_minutes * 60),
    }
  }

  pub fn scheduler_config(&self) -> SchedulerConfig {
    SchedulerConfig {
      policy: SchedulePolicy {
        base: Duration::from_secs(self.base_interval_minutes * 60),
        fast: Duration::from_secs(self.fast_interval_minutes * 60),
        ..SchedulePolicy::default()
      },
      tick_timeout: Duration::from_secs(self.tick_timeout_secs),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

pub type Repository =
  WidgetDataRepository<SqliteSnapshotStore, HttpPartnerGateway, FileUserState>;
pub type Scheduler = RefreshScheduler<Repository, NoConstraints>;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub repository: Arc<Repository>,
  pub scheduler:  Arc<Scheduler>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the daemon surface.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/snapshot", get(handlers::snapshot))
    .route("/status", get(handlers::status))
    .route("/refresh", post(handlers::refresh))
    .route("/events/app-foreground", post(handlers::app_foreground))
    .route("/widgets/attached", post(handlers::widget_attached))
    .route("/widgets/detached", post(handlers::widget_detached))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
