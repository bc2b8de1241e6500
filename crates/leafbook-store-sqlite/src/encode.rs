//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order in SQL equals chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use leafbook_core::plant::{ImageRef, Plant};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Truncate `dt` to the precision a stored timestamp keeps, so values handed
/// back to callers compare equal to what a later read returns.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPlant::from_row`].
pub const PLANT_COLUMNS: &str = "id, name, family, age_months, image_path, \
                                 image_media_type, image_hash, created_at, \
                                 last_leaf_at";

/// Raw values read directly from a `plants` row.
pub struct RawPlant {
  pub id:               i64,
  pub name:             String,
  pub family:           String,
  pub age_months:       Option<u32>,
  pub image_path:       Option<String>,
  pub image_media_type: Option<String>,
  pub image_hash:       Option<String>,
  pub created_at:       String,
  pub last_leaf_at:     Option<String>,
}

impl RawPlant {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      name:             row.get(1)?,
      family:           row.get(2)?,
      age_months:       row.get(3)?,
      image_path:       row.get(4)?,
      image_media_type: row.get(5)?,
      image_hash:       row.get(6)?,
      created_at:       row.get(7)?,
      last_leaf_at:     row.get(8)?,
    })
  }

  pub fn into_plant(self) -> Result<Plant> {
    let image = match (self.image_path, self.image_media_type, self.image_hash) {
      (Some(path), Some(media_type), Some(content_hash)) => Some(ImageRef {
        path,
        media_type,
        content_hash,
      }),
      _ => None,
    };

    Ok(Plant {
      id: self.id,
      name: self.name,
      family: self.family,
      age_months: self.age_months,
      image,
      created_at: decode_dt(&self.created_at)?,
      last_leaf_at: self.last_leaf_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Split an optional image into its three nullable columns.
pub fn image_columns(
  image: Option<&ImageRef>,
) -> (Option<String>, Option<String>, Option<String>) {
  match image {
    Some(i) => (
      Some(i.path.clone()),
      Some(i.media_type.clone()),
      Some(i.content_hash.clone()),
    ),
    None => (None, None, None),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(250);
    let c = a + chrono::Duration::seconds(1);

    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < eb && eb < ec);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
