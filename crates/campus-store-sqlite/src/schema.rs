//! SQL schema for the campus SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One JSON document per key. A write replaces the whole document.
CREATE TABLE IF NOT EXISTS kv (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,   -- JSON document
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
