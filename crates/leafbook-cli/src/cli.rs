//! Command-line surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "leafbook", version, about = "Personal plant catalogue")]
pub struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "leafbook.toml", global = true)]
  pub config: PathBuf,

  /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
  #[arg(short, long, action = ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Defaults to `list`.
  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
  /// List every plant, ordered by name
  List {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Show at most this many plants.
    #[arg(long)]
    limit:  Option<usize>,
  },
  /// Add a new plant
  AddPlant(AddPlantArgs),
  /// Find plants whose name or family contains the query
  SearchPlant {
    #[arg(short, long)]
    query:  String,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    #[arg(long)]
    limit:  Option<usize>,
  },
  /// Change selected fields of a plant; omitted fields keep their value
  EditPlant(EditPlantArgs),
  /// Write a collection report to the report directory
  Report,
  /// Record that a plant grew a new leaf
  AddLeaf {
    #[arg(long)]
    id:   i64,
    /// Day the leaf appeared (YYYY-MM-DD); defaults to now.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },
  /// Show leaf statistics for one plant, or export them for all plants
  LeafStats {
    #[arg(long)]
    id:     Option<i64>,
    /// CSV destination when exporting all plants.
    #[arg(short, long, value_name = "FILE", conflicts_with = "id")]
    output: Option<PathBuf>,
  },
  /// Open a plant's photo in the configured viewer
  ShowImage {
    #[arg(long)]
    id: i64,
  },
}

impl Default for Command {
  fn default() -> Self {
    Self::List {
      format: OutputFormat::default(),
      limit:  None,
    }
  }
}

#[derive(Args, Debug, PartialEq)]
pub struct AddPlantArgs {
  #[arg(short, long)]
  pub name:       String,
  #[arg(short, long)]
  pub family:     String,
  #[arg(long)]
  pub age_months: Option<u32>,
  /// Photo to normalise and store.
  #[arg(long, value_name = "FILE")]
  pub image:      Option<PathBuf>,
}

#[derive(Args, Debug, PartialEq)]
#[command(group(
  ArgGroup::new("changes")
    .required(true)
    .multiple(true)
    .args(["name", "family", "age_months", "image"]),
))]
pub struct EditPlantArgs {
  #[arg(long)]
  pub id:         i64,
  #[arg(short, long)]
  pub name:       Option<String>,
  #[arg(short, long)]
  pub family:     Option<String>,
  #[arg(long)]
  pub age_months: Option<u32>,
  #[arg(long, value_name = "FILE")]
  pub image:      Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
  #[default]
  Table,
  Csv,
  Json,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| format!("invalid date {s:?}; use YYYY-MM-DD"))
}
