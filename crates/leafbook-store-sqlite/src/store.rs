//! [`SqliteStore`]: the SQLite implementation of [`PlantStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use leafbook_core::{
  leaf::LeafEvent,
  plant::{NewPlant, Plant, PlantPatch},
  store::{PlantQuery, PlantStore},
};

use crate::{
  encode::{
    decode_dt, encode_dt, image_columns, stored_precision, RawPlant, PLANT_COLUMNS,
  },
  query::{register_functions, select_plants},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A plant catalogue backed by a single SQLite file.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    let store = Self { conn };
    store.init()?;
    Ok(store)
  }

  /// Open an in-memory store. Nothing is persisted.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init()?;
    Ok(store)
  }

  fn init(&self) -> Result<()> {
    register_functions(&self.conn)?;
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  fn fetch_plant(conn: &Connection, id: i64) -> Result<Option<Plant>> {
    let raw: Option<RawPlant> = conn
      .query_row(
        &format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = ?1"),
        rusqlite::params![id],
        RawPlant::from_row,
      )
      .optional()?;

    raw.map(RawPlant::into_plant).transpose()
  }

  fn plant_exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(
      conn
        .query_row(
          "SELECT 1 FROM plants WHERE id = ?1",
          rusqlite::params![id],
          |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false),
    )
  }
}

// ─── PlantStore impl ─────────────────────────────────────────────────────────

impl PlantStore for SqliteStore {
  type Error = Error;

  // ── Plants ────────────────────────────────────────────────────────────────

  fn insert_plant(&self, input: NewPlant) -> Result<Plant> {
    let created_at = stored_precision(Utc::now());
    let (image_path, image_media_type, image_hash) =
      image_columns(input.image.as_ref());

    self.conn.execute(
      "INSERT INTO plants (
         name, family, age_months,
         image_path, image_media_type, image_hash,
         created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        input.name,
        input.family,
        input.age_months,
        image_path,
        image_media_type,
        image_hash,
        encode_dt(created_at),
      ],
    )?;
    let id = self.conn.last_insert_rowid();
    debug!(id, name = %input.name, "inserted plant");

    Ok(Plant {
      id,
      name: input.name,
      family: input.family,
      age_months: input.age_months,
      image: input.image,
      created_at,
      last_leaf_at: None,
    })
  }

  fn update_plant(&self, id: i64, patch: &PlantPatch) -> Result<bool> {
    let tx = self.conn.unchecked_transaction()?;

    let Some(existing) = Self::fetch_plant(&tx, id)? else {
      return Ok(false);
    };
    let merged = existing.merged(patch)?;
    let (image_path, image_media_type, image_hash) =
      image_columns(merged.image.as_ref());

    let changed = tx.execute(
      "UPDATE plants
          SET name = ?1, family = ?2, age_months = ?3,
              image_path = ?4, image_media_type = ?5, image_hash = ?6
        WHERE id = ?7",
      rusqlite::params![
        merged.name,
        merged.family,
        merged.age_months,
        image_path,
        image_media_type,
        image_hash,
        id,
      ],
    )?;
    tx.commit()?;
    debug!(id, "updated plant");

    Ok(changed > 0)
  }

  fn get_plant(&self, id: i64) -> Result<Option<Plant>> {
    Self::fetch_plant(&self.conn, id)
  }

  fn query_plants(&self, query: &PlantQuery) -> Result<Vec<Plant>> {
    let bound = select_plants(query);

    let mut stmt = self.conn.prepare(&bound.sql)?;
    let raws = stmt
      .query_map(rusqlite::params_from_iter(bound.params.iter()), RawPlant::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(RawPlant::into_plant).collect()
  }

  // ── Leaf events ───────────────────────────────────────────────────────────

  fn record_leaf_event(
    &self,
    plant_id: i64,
    appeared_at: Option<DateTime<Utc>>,
  ) -> Result<LeafEvent> {
    let appeared_at = stored_precision(appeared_at.unwrap_or_else(Utc::now));
    let tx = self.conn.unchecked_transaction()?;

    if !Self::plant_exists(&tx, plant_id)? {
      return Err(Error::PlantNotFound(plant_id));
    }

    tx.execute(
      "INSERT INTO leaf_events (plant_id, appeared_at) VALUES (?1, ?2)",
      rusqlite::params![plant_id, encode_dt(appeared_at)],
    )?;
    tx.execute(
      "UPDATE plants
          SET last_leaf_at = (SELECT MAX(appeared_at) FROM leaf_events WHERE plant_id = ?1)
        WHERE id = ?1",
      rusqlite::params![plant_id],
    )?;
    tx.commit()?;
    debug!(plant_id, %appeared_at, "recorded leaf event");

    Ok(LeafEvent { plant_id, appeared_at })
  }

  fn list_leaf_events(&self, plant_id: i64) -> Result<Vec<DateTime<Utc>>> {
    let mut stmt = self.conn.prepare(
      "SELECT appeared_at FROM leaf_events
        WHERE plant_id = ?1
        ORDER BY appeared_at, id",
    )?;
    let raws = stmt
      .query_map(rusqlite::params![plant_id], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.iter().map(|s| decode_dt(s)).collect()
  }
}
