//! SQLite backend for the leafbook plant catalogue.
//!
//! Wraps a single [`rusqlite::Connection`]; every call runs to completion on
//! the calling thread.

mod encode;
mod query;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
