//! Presentation of plants and statistics: terminal tables, CSV, JSON and the
//! plain-text collection report.
//!
//! Rounding happens here and nowhere else; the statistics types carry
//! unrounded values.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use leafbook_core::{leaf::LeafStats, plant::Plant, report::CollectionStats};

pub const PLANT_HEADER: [&str; 7] =
  ["ID", "Name", "Family", "Image", "Age (months)", "Added", "Last Leaf"];

pub const LEAF_STATS_HEADER: [&str; 5] = [
  "Plant ID",
  "Name",
  "Total Leaves",
  "Avg Days Between Leaves",
  "Days Since Last Leaf",
];

// ─── Plants ──────────────────────────────────────────────────────────────────

fn plant_row(plant: &Plant) -> [String; 7] {
  [
    plant.id.to_string(),
    plant.name.clone(),
    plant.family.clone(),
    plant.image.as_ref().map(|i| i.path.clone()).unwrap_or_default(),
    plant.age_months.map(|a| a.to_string()).unwrap_or_default(),
    plant.created_at.format("%Y-%m-%d %H:%M").to_string(),
    plant
      .last_leaf_at
      .map(|d| d.format("%Y-%m-%d").to_string())
      .unwrap_or_default(),
  ]
}

pub fn plant_table(plants: &[Plant]) -> Table {
  let mut table = Table::new();
  table
    .load_preset(UTF8_FULL)
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_header(PLANT_HEADER.iter().map(Cell::new));

  for plant in plants {
    table.add_row(plant_row(plant));
  }
  table
}

pub fn write_plants_csv(out: impl Write, plants: &[Plant]) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(PLANT_HEADER)?;
  for plant in plants {
    wtr.write_record(plant_row(plant))?;
  }
  wtr.flush()?;
  Ok(())
}

pub fn write_plants_json(mut out: impl Write, plants: &[Plant]) -> Result<()> {
  serde_json::to_writer_pretty(&mut out, plants)?;
  writeln!(out)?;
  Ok(())
}

// ─── Leaf statistics ─────────────────────────────────────────────────────────

fn one_decimal(value: Option<f64>) -> String {
  value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

/// Human-readable statistics for a single plant.
pub fn write_leaf_stats(mut out: impl Write, plant: &Plant, stats: &LeafStats) -> Result<()> {
  writeln!(out, "Leaf statistics for {} (ID {}):", plant.name, plant.id)?;
  writeln!(out, "Total leaves: {}", stats.total_count)?;
  if let Some(avg) = stats.avg_interval_days {
    writeln!(out, "Average days between leaves: {avg:.1}")?;
  }
  if let Some(days) = stats.days_since_last {
    writeln!(out, "Days since last leaf: {days}")?;
  }
  Ok(())
}

pub fn write_leaf_stats_csv(out: impl Write, rows: &[(Plant, LeafStats)]) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(LEAF_STATS_HEADER)?;
  for (plant, stats) in rows {
    wtr.write_record([
      plant.id.to_string(),
      plant.name.clone(),
      stats.total_count.to_string(),
      one_decimal(stats.avg_interval_days),
      stats.days_since_last.map(|d| d.to_string()).unwrap_or_default(),
    ])?;
  }
  wtr.flush()?;
  Ok(())
}

// ─── Collection report ───────────────────────────────────────────────────────

pub fn write_collection_report(
  mut out: impl Write,
  stats: &CollectionStats,
  generated_at: DateTime<Utc>,
) -> Result<()> {
  writeln!(out, "Plant Collection Report")?;
  writeln!(out, "=======================")?;
  writeln!(out)?;
  writeln!(out, "Total plants:       {}", stats.total_plants)?;
  writeln!(out, "Number of families: {}", stats.family_count)?;
  match &stats.most_common_family {
    Some((family, count)) => writeln!(out, "Most common family: {family} ({count})")?,
    None => writeln!(out, "Most common family: -")?,
  }
  writeln!(out, "Plants with images: {}", stats.plants_with_images)?;

  writeln!(out)?;
  writeln!(out, "Age (months)")?;
  writeln!(out, "------------")?;
  match &stats.age {
    Some(age) => {
      writeln!(out, "Average:  {:.1}", age.mean)?;
      writeln!(out, "Median:   {:.1}", age.median)?;
      writeln!(out, "Youngest: {}", age.min)?;
      writeln!(out, "Oldest:   {}", age.max)?;
    }
    None => writeln!(out, "No plant has a recorded age.")?,
  }

  writeln!(out)?;
  writeln!(out, "Family distribution")?;
  writeln!(out, "-------------------")?;
  for (family, count) in &stats.family_distribution {
    writeln!(out, "{family}: {count}")?;
  }

  writeln!(out)?;
  writeln!(out, "Report generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
  Ok(())
}
