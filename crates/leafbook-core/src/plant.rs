//! Plant records and the merge-update rule.
//!
//! A plant is created once and afterwards only changed through a
//! [`PlantPatch`]. A patch carries exactly the fields the user supplied;
//! everything it leaves out keeps its persisted value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Image reference ─────────────────────────────────────────────────────────

/// A normalised plant photo stored on disk; no image bytes live in the
/// database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
  /// Location of the stored file.
  pub path:         String,
  pub media_type:   String,
  /// SHA-256 hex digest of the stored bytes.
  pub content_hash: String,
}

// ─── Plant ───────────────────────────────────────────────────────────────────

/// A catalogued plant as persisted by a [`crate::store::PlantStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
  /// Store-assigned; never changes after creation.
  pub id:           i64,
  pub name:         String,
  pub family:       String,
  pub age_months:   Option<u32>,
  pub image:        Option<ImageRef>,
  /// Store-assigned; never changes after creation.
  pub created_at:   DateTime<Utc>,
  /// Latest recorded leaf appearance, maintained by the store.
  pub last_leaf_at: Option<DateTime<Utc>>,
}

impl Plant {
  /// Apply `patch` on top of `self`: supplied fields replace, absent fields
  /// keep their current value. Identity and store-maintained timestamps are
  /// never touched.
  pub fn merged(&self, patch: &PlantPatch) -> Result<Plant> {
    patch.validate()?;

    Ok(Plant {
      id:           self.id,
      name:         patch
        .name
        .as_deref()
        .map(normalize)
        .unwrap_or_else(|| self.name.clone()),
      family:       patch
        .family
        .as_deref()
        .map(normalize)
        .unwrap_or_else(|| self.family.clone()),
      age_months:   patch.age_months.or(self.age_months),
      image:        patch.image.clone().or_else(|| self.image.clone()),
      created_at:   self.created_at,
      last_leaf_at: self.last_leaf_at,
    })
  }
}

// ─── NewPlant ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PlantStore::insert_plant`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
  pub name:       String,
  pub family:     String,
  pub age_months: Option<u32>,
  pub image:      Option<ImageRef>,
}

impl NewPlant {
  /// Validate and build a new plant. Name and family must be non-empty.
  pub fn new(
    name: &str,
    family: &str,
    age_months: Option<u32>,
    image: Option<ImageRef>,
  ) -> Result<Self> {
    Ok(Self {
      name: required("name", name)?,
      family: required("family", family)?,
      age_months,
      image,
    })
  }
}

// ─── PlantPatch ──────────────────────────────────────────────────────────────

/// A partial update. `None` means "not supplied", never "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantPatch {
  pub name:       Option<String>,
  pub family:     Option<String>,
  pub age_months: Option<u32>,
  pub image:      Option<ImageRef>,
}

impl PlantPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.family.is_none()
      && self.age_months.is_none()
      && self.image.is_none()
  }

  /// A supplied name or family must still be non-empty.
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      required("name", name)?;
    }
    if let Some(family) = &self.family {
      required("family", family)?;
    }
    Ok(())
  }
}

fn normalize(s: &str) -> String { s.trim().to_owned() }

fn required(field: &str, value: &str) -> Result<String> {
  let value = normalize(value);
  if value.is_empty() {
    return Err(Error::Validation(format!("plant {field} is required")));
  }
  Ok(value)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn rose() -> Plant {
    Plant {
      id:           7,
      name:         "Rose".into(),
      family:       "Unknown".into(),
      age_months:   Some(5),
      image:        Some(ImageRef {
        path:         "data/images/Rose-0a1b2c3d4e5f.jpg".into(),
        media_type:   "image/jpeg".into(),
        content_hash: "0a1b2c3d4e5f".into(),
      }),
      created_at:   Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
      last_leaf_at: Some(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap()),
    }
  }

  #[test]
  fn new_plant_requires_name_and_family() {
    assert!(matches!(
      NewPlant::new("", "Araceae", None, None),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      NewPlant::new("Monstera", "   ", None, None),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn new_plant_trims_text_fields() {
    let p = NewPlant::new("  Monstera ", "Araceae\n", Some(14), None).unwrap();
    assert_eq!(p.name, "Monstera");
    assert_eq!(p.family, "Araceae");
    assert_eq!(p.age_months, Some(14));
  }

  #[test]
  fn merge_replaces_only_supplied_fields() {
    let existing = rose();
    let patch = PlantPatch {
      family: Some("Rosaceae".into()),
      ..Default::default()
    };

    let updated = existing.merged(&patch).unwrap();

    assert_eq!(updated.name, "Rose");
    assert_eq!(updated.family, "Rosaceae");
    assert_eq!(updated.age_months, Some(5));
    assert_eq!(updated.image, existing.image);
  }

  #[test]
  fn empty_patch_is_identity() {
    let existing = rose();
    let patch = PlantPatch::default();
    assert!(patch.is_empty());
    assert_eq!(existing.merged(&patch).unwrap(), existing);
  }

  #[test]
  fn merge_never_touches_store_fields() {
    let existing = rose();
    let patch = PlantPatch {
      name:       Some("Dog Rose".into()),
      family:     Some("Rosaceae".into()),
      age_months: Some(12),
      image:      None,
    };

    let updated = existing.merged(&patch).unwrap();

    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.created_at, existing.created_at);
    assert_eq!(updated.last_leaf_at, existing.last_leaf_at);
    assert_eq!(updated.age_months, Some(12));
    assert_eq!(updated.image, existing.image);
  }

  #[test]
  fn merge_rejects_blank_supplied_name() {
    let patch = PlantPatch {
      name: Some("  ".into()),
      ..Default::default()
    };
    assert!(matches!(rose().merged(&patch), Err(Error::Validation(_))));
  }

  #[test]
  fn merge_adds_image_to_plant_without_one() {
    let mut existing = rose();
    existing.image = None;
    let image = ImageRef {
      path:         "data/images/new.jpg".into(),
      media_type:   "image/jpeg".into(),
      content_hash: "ff".into(),
    };
    let patch = PlantPatch {
      image: Some(image.clone()),
      ..Default::default()
    };

    assert_eq!(existing.merged(&patch).unwrap().image, Some(image));
  }
}
