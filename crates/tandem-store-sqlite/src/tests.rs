//! Integration tests for `SqliteSnapshotStore` against an in-memory database.

use chrono::{NaiveDate, Utc};
use tandem_core::{
  distance::DistanceSnapshot,
  geo::{DistanceUnit, GeoPoint},
  relationship::RelationshipSnapshot,
  snapshot::{WidgetSnapshot, SCHEMA_VERSION},
  store::SnapshotStore,
};

use crate::SqliteSnapshotStore;

async fn store() -> SqliteSnapshotStore {
  SqliteSnapshotStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sample_snapshot(partner_name: &str) -> WidgetSnapshot {
  let start: NaiveDate = "2023-01-01".parse().unwrap();
  let today: NaiveDate = "2024-01-01".parse().unwrap();
  let now = Utc::now();
  WidgetSnapshot {
    user_name: Some("Léa".into()),
    user_avatar: None,
    partner_name: Some(partner_name.into()),
    partner_avatar: None,
    has_partner: true,
    has_subscription: false,
    relationship: Some(
      RelationshipSnapshot::compute(start, today, now).unwrap(),
    ),
    distance: DistanceSnapshot::compute(
      Some(GeoPoint::new(48.8566, 2.3522)),
      Some(GeoPoint::new(51.5074, -0.1278)),
      DistanceUnit::Km,
      now,
    ),
    computed_at: now,
    schema_version: SCHEMA_VERSION,
  }
}

// ─── Load / save ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_on_fresh_store_returns_none() {
  let s = store().await;
  assert!(s.load().await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_load_roundtrips() {
  let s = store().await;
  let snap = sample_snapshot("Sam");

  s.save(&snap).await.unwrap();

  let record = s.load().await.unwrap().unwrap();
  assert_eq!(record.snapshot, snap);
  assert!(record.written_at >= snap.computed_at);
}

#[tokio::test]
async fn save_fully_replaces_previous_record() {
  let s = store().await;

  s.save(&sample_snapshot("Sam")).await.unwrap();
  s.save(&sample_snapshot("Alex")).await.unwrap();

  let record = s.load().await.unwrap().unwrap();
  assert_eq!(record.snapshot.partner_name.as_deref(), Some("Alex"));

  // Still exactly one structured record.
  let count: i64 = s
    .conn
    .call(|conn| {
      Ok(conn.query_row("SELECT COUNT(*) FROM snapshot_cache", [], |r| r.get(0))?)
    })
    .await
    .unwrap();
  assert_eq!(count, 1);
}

// ─── Mirror ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mirror_is_written_alongside_the_payload() {
  let s = store().await;
  s.save(&sample_snapshot("Sam")).await.unwrap();

  assert_eq!(
    s.mirror_value("duration_text").await.unwrap().as_deref(),
    Some("1 an")
  );
  assert_eq!(
    s.mirror_value("distance_status").await.unwrap().as_deref(),
    Some("far")
  );
  assert_eq!(
    s.mirror_value("has_partner").await.unwrap().as_deref(),
    Some("true")
  );
  assert!(s.mirror_value("no_such_key").await.unwrap().is_none());
}

#[tokio::test]
async fn mirror_tracks_the_latest_snapshot() {
  let s = store().await;

  s.save(&sample_snapshot("Sam")).await.unwrap();
  let mut without_distance = sample_snapshot("Sam");
  without_distance.distance = None;
  s.save(&without_distance).await.unwrap();

  // Placeholder copy replaces the stale computed values.
  assert_eq!(
    s.mirror_value("distance_status").await.unwrap().as_deref(),
    Some("no_location")
  );
  assert_eq!(
    s.mirror_value("distance_text").await.unwrap().as_deref(),
    Some("Position inconnue")
  );
}

// ─── Corruption ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_payload_surfaces_a_recoverable_error() {
  let s = store().await;
  s.save(&sample_snapshot("Sam")).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute(
        "UPDATE snapshot_cache SET payload_json = '{not json'",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.load().await.unwrap_err();
  assert!(err.is_corrupt(), "expected Corrupt, got: {err}");
}

// ─── Durability ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_backed_store_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("widget-cache.sqlite3");

  {
    let s = SqliteSnapshotStore::open(&path).await.unwrap();
    s.save(&sample_snapshot("Sam")).await.unwrap();
  }

  let reopened = SqliteSnapshotStore::open(&path).await.unwrap();
  let record = reopened.load().await.unwrap().unwrap();
  assert_eq!(record.snapshot.partner_name.as_deref(), Some("Sam"));
  assert_eq!(
    reopened.mirror_value("duration_text").await.unwrap().as_deref(),
    Some("1 an")
  );
}
