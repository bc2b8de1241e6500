//! Core types and trait definitions for the leafbook plant catalogue.
//!
//! This crate is deliberately free of database, image and terminal
//! dependencies. Every other crate depends on it.

pub mod error;
pub mod leaf;
pub mod plant;
pub mod report;
pub mod store;

pub use error::{Error, Result};
