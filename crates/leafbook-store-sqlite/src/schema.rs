//! SQL schema for the leafbook SQLite store.
//!
//! Executed once at connection startup. Older catalogue layouts are not
//! migrated; `PRAGMA user_version` records which layout a file holds.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS plants (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL CHECK (length(trim(name)) > 0),
    family           TEXT NOT NULL CHECK (length(trim(family)) > 0),
    age_months       INTEGER,         -- NULL when unknown
    image_path       TEXT,            -- the three image columns are set together
    image_media_type TEXT,
    image_hash       TEXT,
    created_at       TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    last_leaf_at     TEXT             -- MAX(leaf_events.appeared_at) for the plant
);

-- Leaf events are strictly append-only.
CREATE TABLE IF NOT EXISTS leaf_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_id    INTEGER NOT NULL REFERENCES plants(id),
    appeared_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS plants_name_idx      ON plants(name);
CREATE INDEX IF NOT EXISTS leaf_events_plant_idx ON leaf_events(plant_id, appeared_at);

PRAGMA user_version = 1;
";
