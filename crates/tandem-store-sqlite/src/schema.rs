//! SQL schema for the Tandem snapshot cache.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`; the snapshot payload itself additionally carries
//! its own `schema_version` field.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// WAL keeps renderer-side readers unblocked while the repository writes.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- The structured record: one serialized WidgetSnapshot under a fixed key.
-- Always replaced whole, inside a transaction.
CREATE TABLE IF NOT EXISTS snapshot_cache (
    key          TEXT PRIMARY KEY,
    payload_json TEXT NOT NULL,   -- serialized WidgetSnapshot
    written_at   TEXT NOT NULL    -- ISO 8601 UTC; store-assigned
);

-- Denormalized flat mirror of the same snapshot, for renderers that cannot
-- afford structured deserialization. Written only by the same transaction
-- that writes snapshot_cache, from the snapshot's canonical export.
CREATE TABLE IF NOT EXISTS snapshot_mirror (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
