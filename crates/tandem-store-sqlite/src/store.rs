//! [`SqliteSnapshotStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use tandem_core::{
  snapshot::{CacheRecord, WidgetSnapshot, CACHE_KEY},
  store::SnapshotStore,
};

use crate::{schema::SCHEMA, Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot cache backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSnapshotStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteSnapshotStore {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory cache — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read a single mirror value. This is the renderer's O(1) read path; it
  /// never touches the structured payload.
  pub async fn mirror_value(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM snapshot_mirror WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteSnapshotStore {
  type Error = Error;

  async fn load(&self) -> Result<Option<CacheRecord>> {
    let raw: Option<(String, String)> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload_json, written_at FROM snapshot_cache WHERE key = ?1",
              rusqlite::params![CACHE_KEY],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((payload_json, written_at_str)) = raw else {
      return Ok(None);
    };

    let snapshot = WidgetSnapshot::from_json(&payload_json)
      .map_err(|e| Error::Corrupt(e.to_string()))?;
    let written_at = decode_dt(&written_at_str)?;

    Ok(Some(CacheRecord { snapshot, written_at }))
  }

  async fn save(&self, snapshot: &WidgetSnapshot) -> Result<()> {
    let written_at = Utc::now();
    let payload_json = snapshot
      .to_json()
      .map_err(|e| Error::Corrupt(e.to_string()))?;
    // Single canonical export: structured record and flat mirror come from
    // the same snapshot and land in the same transaction.
    let mirror: Vec<(&'static str, String)> = snapshot.mirror_entries();
    let written_at_str = encode_dt(written_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO snapshot_cache (key, payload_json, written_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             payload_json = excluded.payload_json,
             written_at   = excluded.written_at",
          rusqlite::params![CACHE_KEY, payload_json, written_at_str],
        )?;

        tx.execute("DELETE FROM snapshot_mirror", [])?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO snapshot_mirror (key, value) VALUES (?1, ?2)",
          )?;
          for (key, value) in &mirror {
            stmt.execute(rusqlite::params![key, value])?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(written_at = %written_at, "snapshot cache replaced");
    Ok(())
  }
}

// ─── Encoding ────────────────────────────────────────────────────────────────

fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}
