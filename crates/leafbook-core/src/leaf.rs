//! Leaf events and the per-plant statistics derived from them.
//!
//! Leaf events are append-only: once recorded they are never changed or
//! removed. Everything in [`LeafStats`] is computed on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded appearance of a new leaf on a plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafEvent {
  pub plant_id:    i64,
  pub appeared_at: DateTime<Utc>,
}

/// Aggregate metrics over one plant's leaf events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafStats {
  pub total_count:       usize,
  /// Mean gap between consecutive events in whole days. Unrounded; `None`
  /// with fewer than two events.
  pub avg_interval_days: Option<f64>,
  /// Whole days from the latest event to `now`.
  pub days_since_last:   Option<i64>,
}

impl LeafStats {
  /// Compute statistics for `events` as seen at `now`.
  ///
  /// Events need not be sorted. Gaps are whole days, truncated toward zero;
  /// equal timestamps contribute a zero-day gap.
  pub fn compute(events: &[DateTime<Utc>], now: DateTime<Utc>) -> Self {
    let mut sorted = events.to_vec();
    sorted.sort();

    let avg_interval_days = if sorted.len() > 1 {
      let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
      Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
    } else {
      None
    };

    let days_since_last = sorted.last().map(|last| (now - *last).num_days());

    Self {
      total_count: sorted.len(),
      avg_interval_days,
      days_since_last,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap() + Duration::days(offset)
  }

  #[test]
  fn empty_sequence_has_no_interval_or_recency() {
    let stats = LeafStats::compute(&[], day(0));
    assert_eq!(stats.total_count, 0);
    assert_eq!(stats.avg_interval_days, None);
    assert_eq!(stats.days_since_last, None);
  }

  #[test]
  fn single_event_reports_recency_only() {
    let stats = LeafStats::compute(&[day(0)], day(12));
    assert_eq!(stats.total_count, 1);
    assert_eq!(stats.avg_interval_days, None);
    assert_eq!(stats.days_since_last, Some(12));
  }

  #[test]
  fn average_includes_zero_day_gaps() {
    let events = [day(0), day(3), day(3), day(10)];
    let stats = LeafStats::compute(&events, day(10));

    assert_eq!(stats.total_count, 4);
    let avg = stats.avg_interval_days.unwrap();
    assert!((avg - 10.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.days_since_last, Some(0));
  }

  #[test]
  fn unsorted_input_is_sorted_first() {
    let events = [day(10), day(0), day(3), day(3)];
    let stats = LeafStats::compute(&events, day(15));
    assert!((stats.avg_interval_days.unwrap() - 10.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.days_since_last, Some(5));
  }

  #[test]
  fn gaps_truncate_partial_days() {
    let first = day(0);
    let second = first + Duration::hours(47);
    let now = second + Duration::hours(23);

    let stats = LeafStats::compute(&[first, second], now);

    assert_eq!(stats.avg_interval_days, Some(1.0));
    assert_eq!(stats.days_since_last, Some(0));
  }
}
