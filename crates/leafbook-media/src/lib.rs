//! Photo handling for leafbook: normalising uploaded images into the image
//! directory, and handing stored images to an external viewer.

mod ingest;
mod viewer;

pub mod error;

pub use error::{Error, Result};
pub use ingest::{ImageIngestor, MAX_DIMENSION};
pub use viewer::{CommandViewer, ImageViewer};
