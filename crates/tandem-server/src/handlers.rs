//! Handlers for the loopback trigger/read surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/snapshot` | Last known snapshot; never blocks, never refreshes |
//! | `GET`  | `/status` | Pipeline telemetry |
//! | `POST` | `/refresh` | Body: `{"force": bool}`; runs/attaches to a refresh |
//! | `POST` | `/events/app-foreground` | Staleness-gated refresh |
//! | `POST` | `/widgets/attached` | Scheduler refcount up |
//! | `POST` | `/widgets/detached` | Scheduler refcount down |

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandem_core::snapshot::WidgetSnapshot;

use crate::{error::ApiError, AppState};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /snapshot` — the renderer's in-process read path.
pub async fn snapshot(State(state): State<AppState>) -> Json<WidgetSnapshot> {
  Json(state.repository.current())
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
  pub is_refreshing:        bool,
  pub last_error:           Option<String>,
  pub scheduler_running:    bool,
  pub scheduler_last_error: Option<String>,
  pub active_widgets:       usize,
  pub snapshot_computed_at: DateTime<Utc>,
}

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<StatusBody> {
  Json(StatusBody {
    is_refreshing:        state.repository.is_refreshing(),
    last_error:           state.repository.last_error(),
    scheduler_running:    state.scheduler.is_running(),
    scheduler_last_error: state.scheduler.last_error(),
    active_widgets:       state.scheduler.active_widgets(),
    snapshot_computed_at: state.repository.current().computed_at,
  })
}

// ─── Refresh triggers ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  #[serde(default = "default_force")]
  pub force: bool,
}

fn default_force() -> bool {
  true
}

/// `POST /refresh` — explicit, user-initiated.
pub async fn refresh(
  State(state): State<AppState>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<WidgetSnapshot>, ApiError> {
  let snapshot = state.repository.refresh(body.force).await?;
  Ok(Json(snapshot))
}

/// `POST /events/app-foreground` — cheap: satisfied from the cache while the
/// snapshot is fresh.
pub async fn app_foreground(
  State(state): State<AppState>,
) -> Result<Json<WidgetSnapshot>, ApiError> {
  let snapshot = state.repository.refresh(false).await?;
  Ok(Json(snapshot))
}

// ─── Widget lifecycle ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WidgetCount {
  pub active: usize,
}

/// `POST /widgets/attached` — the first widget starts the scheduler, which
/// refreshes immediately.
pub async fn widget_attached(State(state): State<AppState>) -> Json<WidgetCount> {
  Json(WidgetCount { active: state.scheduler.widget_attached() })
}

/// `POST /widgets/detached`
pub async fn widget_detached(State(state): State<AppState>) -> Json<WidgetCount> {
  Json(WidgetCount { active: state.scheduler.widget_detached() })
}
