//! Aggregate statistics over a whole plant collection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::plant::Plant;

/// Summary of plant ages, in months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeStats {
  pub mean:   f64,
  pub median: f64,
  pub min:    u32,
  pub max:    u32,
}

impl AgeStats {
  /// `None` when `ages` is empty.
  pub fn compute(ages: &[u32]) -> Option<Self> {
    let mut sorted = ages.to_vec();
    sorted.sort_unstable();

    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let n = sorted.len();
    let mean = sorted.iter().map(|&a| f64::from(a)).sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
      (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    } else {
      f64::from(sorted[n / 2])
    };

    Some(Self { mean, median, min, max })
  }
}

/// Collection-level report figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
  pub total_plants:        usize,
  pub family_count:        usize,
  /// The family with the most plants and its count. On a tie the family
  /// encountered first in the input wins.
  pub most_common_family:  Option<(String, usize)>,
  pub plants_with_images:  usize,
  /// Over plants that have an age; `None` if none do.
  pub age:                 Option<AgeStats>,
  /// Sorted by descending count, then family name.
  pub family_distribution: Vec<(String, usize)>,
}

impl CollectionStats {
  pub fn compute(plants: &[Plant]) -> Self {
    // Counts kept in first-seen order so ties resolve deterministically.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for plant in plants {
      let count = counts.entry(plant.family.as_str()).or_insert_with(|| {
        order.push(plant.family.as_str());
        0
      });
      *count += 1;
    }

    let mut most_common_family: Option<(String, usize)> = None;
    for family in &order {
      let count = counts[family];
      if most_common_family.as_ref().is_none_or(|(_, best)| count > *best) {
        most_common_family = Some(((*family).to_owned(), count));
      }
    }

    let mut family_distribution: Vec<(String, usize)> = order
      .iter()
      .map(|family| ((*family).to_owned(), counts[family]))
      .collect();
    family_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let ages: Vec<u32> = plants.iter().filter_map(|p| p.age_months).collect();

    Self {
      total_plants: plants.len(),
      family_count: order.len(),
      most_common_family,
      plants_with_images: plants.iter().filter(|p| p.image.is_some()).count(),
      age: AgeStats::compute(&ages),
      family_distribution,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::plant::ImageRef;

  fn plant(id: i64, family: &str, age_months: Option<u32>, image: bool) -> Plant {
    Plant {
      id,
      name: format!("plant-{id}"),
      family: family.into(),
      age_months,
      image: image.then(|| ImageRef {
        path:         format!("data/images/plant-{id}.jpg"),
        media_type:   "image/jpeg".into(),
        content_hash: format!("{id:x}"),
      }),
      created_at: Utc::now(),
      last_leaf_at: None,
    }
  }

  #[test]
  fn age_stats_even_count() {
    let stats = AgeStats::compute(&[9, 4, 2, 4]).unwrap();
    assert!((stats.mean - 4.75).abs() < 1e-9);
    assert!((stats.median - 4.0).abs() < 1e-9);
    assert_eq!(stats.min, 2);
    assert_eq!(stats.max, 9);
  }

  #[test]
  fn age_stats_odd_count_and_empty() {
    let stats = AgeStats::compute(&[7, 1, 3]).unwrap();
    assert!((stats.median - 3.0).abs() < 1e-9);
    assert!(AgeStats::compute(&[]).is_none());
  }

  #[test]
  fn empty_collection() {
    let stats = CollectionStats::compute(&[]);
    assert_eq!(stats.total_plants, 0);
    assert_eq!(stats.family_count, 0);
    assert!(stats.most_common_family.is_none());
    assert!(stats.age.is_none());
    assert!(stats.family_distribution.is_empty());
  }

  #[test]
  fn collection_figures() {
    let plants = vec![
      plant(1, "Araceae", Some(2), true),
      plant(2, "Cactaceae", None, false),
      plant(3, "Araceae", Some(4), false),
      plant(4, "Rosaceae", Some(4), true),
      plant(5, "Araceae", Some(9), false),
      plant(6, "Cactaceae", None, false),
    ];

    let stats = CollectionStats::compute(&plants);

    assert_eq!(stats.total_plants, 6);
    assert_eq!(stats.family_count, 3);
    assert_eq!(stats.most_common_family, Some(("Araceae".into(), 3)));
    assert_eq!(stats.plants_with_images, 2);
    let age = stats.age.unwrap();
    assert!((age.mean - 4.75).abs() < 1e-9);
    assert_eq!((age.min, age.max), (2, 9));
    assert_eq!(
      stats.family_distribution,
      vec![
        ("Araceae".to_string(), 3),
        ("Cactaceae".to_string(), 2),
        ("Rosaceae".to_string(), 1),
      ]
    );
  }

  #[test]
  fn most_common_family_tie_goes_to_first_seen() {
    let plants = vec![
      plant(1, "Piperaceae", None, false),
      plant(2, "Begoniaceae", None, false),
      plant(3, "Begoniaceae", None, false),
      plant(4, "Piperaceae", None, false),
    ];

    let stats = CollectionStats::compute(&plants);

    assert_eq!(stats.most_common_family, Some(("Piperaceae".into(), 2)));
    // Distribution order is independent of input order.
    assert_eq!(stats.family_distribution[0].0, "Begoniaceae");
  }

  #[test]
  fn most_common_count_matches_max_frequency() {
    let families = ["A", "B", "C", "B", "C", "C", "A", "D"];
    let plants: Vec<Plant> = families
      .iter()
      .enumerate()
      .map(|(i, f)| plant(i as i64, f, None, false))
      .collect();

    let stats = CollectionStats::compute(&plants);
    let max = stats.family_distribution.iter().map(|(_, c)| *c).max();

    assert_eq!(stats.most_common_family.map(|(_, c)| c), max);
  }
}
