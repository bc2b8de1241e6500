//! Normalise a user-supplied photo into the image directory.
//!
//! Every stored image is an orientation-corrected RGB JPEG whose longest side
//! is at most [`MAX_DIMENSION`] pixels. Files are named after the plant and a
//! prefix of the content hash, so re-importing the same photo is idempotent.

use std::{
  fs,
  path::{Path, PathBuf},
};

use image::{
  DynamicImage, ImageDecoder as _, ImageReader, codecs::jpeg::JpegEncoder,
  imageops::FilterType,
};
use leafbook_core::plant::ImageRef;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{Error, Result};

/// Longest side, in pixels, of a stored image.
pub const MAX_DIMENSION: u32 = 1200;

const JPEG_QUALITY: u8 = 85;
const MEDIA_TYPE: &str = "image/jpeg";
const HASH_PREFIX_LEN: usize = 12;

/// Writes normalised photos into a single directory.
#[derive(Debug, Clone)]
pub struct ImageIngestor {
  dir: PathBuf,
}

impl ImageIngestor {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  /// Ingest `source`, logging and swallowing any failure. A photo that cannot
  /// be processed never aborts the command that supplied it.
  pub fn ingest(&self, source: &Path, label: &str) -> Option<ImageRef> {
    match self.try_ingest(source, label) {
      Ok(image) => {
        info!(source = %source.display(), stored = %image.path, "stored image");
        Some(image)
      }
      Err(e) => {
        warn!(source = %source.display(), error = %e, "skipping image");
        None
      }
    }
  }

  /// Ingest `source`, returning the failure to the caller.
  pub fn try_ingest(&self, source: &Path, label: &str) -> Result<ImageRef> {
    let encoded = normalize(source)?;
    let content_hash = hex::encode(Sha256::digest(&encoded));

    fs::create_dir_all(&self.dir).map_err(Error::io(&self.dir))?;
    let path = self.dir.join(format!(
      "{}-{}.jpg",
      file_stem(label),
      &content_hash[..HASH_PREFIX_LEN]
    ));
    fs::write(&path, &encoded).map_err(Error::io(&path))?;

    Ok(ImageRef {
      path: path.to_string_lossy().into_owned(),
      media_type: MEDIA_TYPE.to_owned(),
      content_hash,
    })
  }
}

/// Decode, orient, downscale and re-encode `source` as JPEG bytes.
fn normalize(source: &Path) -> Result<Vec<u8>> {
  let mut decoder = ImageReader::open(source)
    .map_err(Error::io(source))?
    .with_guessed_format()
    .map_err(Error::io(source))?
    .into_decoder()?;
  let orientation = decoder.orientation()?;

  let mut img = DynamicImage::from_decoder(decoder)?;
  img.apply_orientation(orientation);

  if img.width().max(img.height()) > MAX_DIMENSION {
    img = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);
  }

  let rgb = img.to_rgb8();
  let mut encoded = Vec::new();
  JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&rgb)?;
  Ok(encoded)
}

/// A filesystem-safe stem derived from a free-text label.
pub(crate) fn file_stem(label: &str) -> String {
  let stem: String = label
    .trim()
    .chars()
    .filter_map(|c| match c {
      c if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
      c if c.is_whitespace() => Some('-'),
      _ => None,
    })
    .collect();
  let stem = stem.trim_matches('.');

  if stem.is_empty() { "plant".to_owned() } else { stem.to_owned() }
}

#[cfg(test)]
mod tests {
  use image::{Rgba, RgbaImage};

  use super::*;

  fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([30, 120, 40, 200]))
      .save(&path)
      .unwrap();
    path
  }

  #[test]
  fn large_image_is_downscaled_to_jpeg() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = write_png(src.path(), "big.png", 2400, 1200);

    let image = ImageIngestor::new(store.path())
      .try_ingest(&source, "Monstera deliciosa")
      .unwrap();

    assert_eq!(image.media_type, "image/jpeg");
    assert_eq!(image.content_hash.len(), 64);
    assert!(image.path.ends_with(".jpg"));
    assert!(image.path.contains("Monstera-deliciosa-"));

    let stored = image::open(&image.path).unwrap();
    assert_eq!((stored.width(), stored.height()), (1200, 600));
    assert!(matches!(stored, DynamicImage::ImageRgb8(_)));
  }

  /// Encode a JPEG and splice in an EXIF block carrying only an
  /// Orientation tag.
  fn write_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90)
      .encode_image(&image::RgbImage::from_pixel(width, height, image::Rgb([90, 160, 70])))
      .unwrap();

    // Little-endian TIFF header, then one IFD with a single SHORT entry.
    let mut exif = b"Exif\0\0II*\0".to_vec();
    exif.extend_from_slice(&8u32.to_le_bytes());
    exif.extend_from_slice(&1u16.to_le_bytes());
    exif.extend_from_slice(&0x0112u16.to_le_bytes());
    exif.extend_from_slice(&3u16.to_le_bytes());
    exif.extend_from_slice(&1u32.to_le_bytes());
    exif.extend_from_slice(&orientation.to_le_bytes());
    exif.extend_from_slice(&[0, 0]);
    exif.extend_from_slice(&0u32.to_le_bytes());

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(exif.len() as u16 + 2).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    fs::write(path, out).unwrap();
  }

  #[test]
  fn exif_orientation_is_applied() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = src.path().join("rotated.jpg");
    // 6: the camera was turned a quarter clockwise.
    write_oriented_jpeg(&source, 40, 20, 6);

    let image = ImageIngestor::new(store.path())
      .try_ingest(&source, "Sideways")
      .unwrap();

    let stored = image::open(&image.path).unwrap();
    assert_eq!((stored.width(), stored.height()), (20, 40));
  }

  #[test]
  fn missing_orientation_keeps_layout() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = src.path().join("upright.jpg");
    write_oriented_jpeg(&source, 40, 20, 1);

    let image = ImageIngestor::new(store.path())
      .try_ingest(&source, "Upright")
      .unwrap();

    let stored = image::open(&image.path).unwrap();
    assert_eq!((stored.width(), stored.height()), (40, 20));
  }

  #[test]
  fn small_image_keeps_its_size() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = write_png(src.path(), "small.png", 300, 200);

    let image = ImageIngestor::new(store.path())
      .try_ingest(&source, "Fern")
      .unwrap();

    let stored = image::open(&image.path).unwrap();
    assert_eq!((stored.width(), stored.height()), (300, 200));
  }

  #[test]
  fn same_photo_maps_to_same_file() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = write_png(src.path(), "p.png", 64, 64);
    let ingestor = ImageIngestor::new(store.path());

    let a = ingestor.try_ingest(&source, "Pilea").unwrap();
    let b = ingestor.try_ingest(&source, "Pilea").unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn corrupt_image_is_skipped() {
    let src = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let source = src.path().join("broken.jpg");
    fs::write(&source, b"definitely not a jpeg").unwrap();
    let ingestor = ImageIngestor::new(store.path());

    assert!(matches!(
      ingestor.try_ingest(&source, "Broken"),
      Err(Error::Image(_))
    ));
    assert!(ingestor.ingest(&source, "Broken").is_none());
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let store = tempfile::tempdir().unwrap();
    let missing = store.path().join("nope.png");

    let err = ImageIngestor::new(store.path())
      .try_ingest(&missing, "Nope")
      .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[test]
  fn file_stem_is_filesystem_safe() {
    assert_eq!(file_stem("Aloe vera"), "Aloe-vera");
    assert_eq!(file_stem("../../etc/passwd"), "etcpasswd");
    assert_eq!(file_stem("  ?*  "), "plant");
  }
}
