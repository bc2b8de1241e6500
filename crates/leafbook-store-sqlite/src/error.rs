//! Error type for `leafbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] leafbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("no plant found with id {0}")]
  PlantNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
