//! Command dispatcher: one method per subcommand.
//!
//! Output goes to the writer passed in by the caller so commands can be
//! exercised against an in-memory buffer.

use std::{
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use anyhow::{Context as _, Result, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use leafbook_core::{
  leaf::LeafStats,
  plant::{NewPlant, Plant, PlantPatch},
  report::CollectionStats,
  store::{PlantQuery, PlantStore},
};
use leafbook_media::{CommandViewer, ImageIngestor, ImageViewer};
use tracing::info;

use crate::{
  cli::{AddPlantArgs, Command, EditPlantArgs, OutputFormat},
  render,
  settings::Settings,
};

/// Everything a command needs, built once at startup.
pub struct App<S: PlantStore> {
  store:      S,
  ingestor:   ImageIngestor,
  viewer:     Box<dyn ImageViewer>,
  report_dir: PathBuf,
}

impl<S: PlantStore> App<S> {
  pub fn new(store: S, settings: &Settings) -> Self {
    Self {
      store,
      ingestor: ImageIngestor::new(&settings.image_dir),
      viewer: Box::new(CommandViewer::new(&settings.viewer_command)),
      report_dir: settings.report_dir.clone(),
    }
  }

  /// Swap the image viewer.
  pub fn with_viewer(mut self, viewer: Box<dyn ImageViewer>) -> Self {
    self.viewer = viewer;
    self
  }

  pub fn run(&self, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
      Command::List { format, limit } => {
        self.list(PlantQuery::all().with_limit(limit), format, out)
      }
      Command::AddPlant(args) => self.add_plant(args, out),
      Command::SearchPlant { query, format, limit } => {
        self.list(PlantQuery::matching(query).with_limit(limit), format, out)
      }
      Command::EditPlant(args) => self.edit_plant(args, out),
      Command::Report => self.report(out),
      Command::AddLeaf { id, date } => self.add_leaf(id, date, out),
      Command::LeafStats { id: Some(id), .. } => self.leaf_stats(id, out),
      Command::LeafStats { id: None, output } => self.export_leaf_stats(output, out),
      Command::ShowImage { id } => self.show_image(id, out),
    }
  }

  fn require_plant(&self, id: i64) -> Result<Plant> {
    match self.store.get_plant(id)? {
      Some(plant) => Ok(plant),
      None => Err(leafbook_core::Error::PlantNotFound(id).into()),
    }
  }

  // ── Plants ────────────────────────────────────────────────────────────────

  fn list(&self, query: PlantQuery, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let plants = self.store.query_plants(&query)?;
    print_plants(&plants, format, out)
  }

  fn add_plant(&self, args: AddPlantArgs, out: &mut impl Write) -> Result<()> {
    let mut input = NewPlant::new(&args.name, &args.family, args.age_months, None)?;
    input.image = args
      .image
      .as_deref()
      .and_then(|path| self.ingestor.ingest(path, &input.name));

    let plant = self.store.insert_plant(input)?;
    info!(id = plant.id, name = %plant.name, "added plant");
    writeln!(out, "Plant added with ID: {}", plant.id)?;
    Ok(())
  }

  fn edit_plant(&self, args: EditPlantArgs, out: &mut impl Write) -> Result<()> {
    let current = self.require_plant(args.id)?;

    // Reject bad text before the photo is written to the image directory.
    let mut patch = PlantPatch {
      name: args.name,
      family: args.family,
      age_months: args.age_months,
      image: None,
    };
    patch.validate()?;

    if let Some(path) = args.image.as_deref() {
      let label = patch.name.as_deref().unwrap_or(&current.name);
      patch.image = self.ingestor.ingest(path, label);
    }
    if patch.is_empty() {
      writeln!(out, "No changes to apply to plant {}", args.id)?;
      return Ok(());
    }

    if !self.store.update_plant(args.id, &patch)? {
      bail!("failed to update plant {}", args.id);
    }
    info!(id = args.id, "updated plant");

    let updated = self.require_plant(args.id)?;
    writeln!(out, "Plant with ID {} updated", args.id)?;
    writeln!(out, "{}", render::plant_table(std::slice::from_ref(&updated)))?;
    Ok(())
  }

  fn report(&self, out: &mut impl Write) -> Result<()> {
    let plants = self.store.list_plants()?;
    let stats = CollectionStats::compute(&plants);
    let now = Utc::now();

    let path = self
      .report_dir
      .join(format!("plant_report_{}.txt", now.format("%Y%m%d_%H%M%S")));
    let mut buf = Vec::new();
    render::write_collection_report(&mut buf, &stats, now)?;
    write_file(&path, &buf)?;
    info!(path = %path.display(), plants = stats.total_plants, "wrote report");

    writeln!(out, "Report generated: {}", path.display())?;
    writeln!(
      out,
      "{} plants in {} families",
      stats.total_plants, stats.family_count
    )?;
    Ok(())
  }

  // ── Leaves ────────────────────────────────────────────────────────────────

  fn add_leaf(&self, id: i64, date: Option<NaiveDate>, out: &mut impl Write) -> Result<()> {
    let appeared_at = date.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let event = self.store.record_leaf_event(id, appeared_at)?;

    writeln!(
      out,
      "Leaf recorded for plant {} on {}",
      event.plant_id,
      event.appeared_at.format("%Y-%m-%d")
    )?;
    Ok(())
  }

  fn leaf_stats(&self, id: i64, out: &mut impl Write) -> Result<()> {
    let plant = self.require_plant(id)?;
    let events = self.store.list_leaf_events(id)?;
    let stats = LeafStats::compute(&events, Utc::now());

    render::write_leaf_stats(out, &plant, &stats)
  }

  fn export_leaf_stats(&self, output: Option<PathBuf>, out: &mut impl Write) -> Result<()> {
    let now = Utc::now();
    let path = output.unwrap_or_else(|| {
      self
        .report_dir
        .join(format!("leaf_statistics_{}.csv", now.format("%Y%m%d")))
    });

    let mut rows = Vec::new();
    for plant in self.store.list_plants()? {
      let events = self.store.list_leaf_events(plant.id)?;
      let stats = LeafStats::compute(&events, now);
      rows.push((plant, stats));
    }

    let mut buf = Vec::new();
    render::write_leaf_stats_csv(&mut buf, &rows)?;
    write_file(&path, &buf)?;
    info!(path = %path.display(), plants = rows.len(), "exported leaf statistics");

    writeln!(out, "Leaf statistics exported to: {}", path.display())?;
    Ok(())
  }

  // ── Images ────────────────────────────────────────────────────────────────

  fn show_image(&self, id: i64, out: &mut impl Write) -> Result<()> {
    let plant = self.require_plant(id)?;
    let Some(image) = &plant.image else {
      writeln!(out, "Plant {} has no image", plant.id)?;
      return Ok(());
    };

    let bytes = fs::read(&image.path)
      .with_context(|| format!("failed to read image {}", image.path))?;
    self.viewer.display(&bytes, &plant.name)?;
    Ok(())
  }
}

fn print_plants(plants: &[Plant], format: OutputFormat, out: &mut impl Write) -> Result<()> {
  match format {
    OutputFormat::Table if plants.is_empty() => writeln!(out, "No plants found")?,
    OutputFormat::Table => writeln!(out, "{}", render::plant_table(plants))?,
    OutputFormat::Csv => render::write_plants_csv(out, plants)?,
    OutputFormat::Json => render::write_plants_json(out, plants)?,
  }
  Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create directory {}", parent.display()))?;
  }
  fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
