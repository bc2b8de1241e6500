//! Error types for `leafbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or empty.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("no plant found with id {0}")]
  PlantNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
