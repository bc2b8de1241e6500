//! The `PlantStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `leafbook-store-sqlite`).
//! The CLI depends on this abstraction, not on any concrete backend.

use chrono::{DateTime, Utc};

use crate::{
  leaf::LeafEvent,
  plant::{NewPlant, Plant, PlantPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for selecting plants. Results are always ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantQuery {
  /// Case-insensitive substring matched against name or family. Matched
  /// literally; wildcard characters carry no special meaning.
  pub text:  Option<String>,
  /// At most this many plants; `None` for all of them.
  pub limit: Option<usize>,
}

impl PlantQuery {
  pub fn all() -> Self { Self::default() }

  pub fn matching(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), limit: None }
  }

  pub fn with_limit(mut self, limit: Option<usize>) -> Self {
    self.limit = limit;
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a plant catalogue backend.
///
/// Plants are never deleted; leaf events are append-only.
pub trait PlantStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Plants ────────────────────────────────────────────────────────────

  /// Persist a new plant. The store assigns `id` and `created_at`.
  fn insert_plant(&self, input: NewPlant) -> Result<Plant, Self::Error>;

  /// Merge `patch` into the stored plant (see [`Plant::merged`]).
  /// Returns `false` if no plant has this id.
  fn update_plant(&self, id: i64, patch: &PlantPatch) -> Result<bool, Self::Error>;

  /// Retrieve a plant by id. Returns `None` if not found.
  fn get_plant(&self, id: i64) -> Result<Option<Plant>, Self::Error>;

  /// Select plants matching `query`, ordered by name ascending.
  fn query_plants(&self, query: &PlantQuery) -> Result<Vec<Plant>, Self::Error>;

  /// Every plant, ordered by name ascending.
  fn list_plants(&self) -> Result<Vec<Plant>, Self::Error> {
    self.query_plants(&PlantQuery::all())
  }

  /// Plants whose name or family contains `text`, ignoring case.
  fn search_plants(&self, text: &str) -> Result<Vec<Plant>, Self::Error> {
    self.query_plants(&PlantQuery::matching(text))
  }

  // ── Leaf events ───────────────────────────────────────────────────────

  /// Record a leaf appearance. `appeared_at` defaults to now. Fails with a
  /// not-found error, writing nothing, if the plant does not exist.
  fn record_leaf_event(
    &self,
    plant_id: i64,
    appeared_at: Option<DateTime<Utc>>,
  ) -> Result<LeafEvent, Self::Error>;

  /// All leaf appearance times for a plant, ascending.
  fn list_leaf_events(&self, plant_id: i64) -> Result<Vec<DateTime<Utc>>, Self::Error>;
}
