//! `leafbook`: command-line plant catalogue.
//!
//! # Usage
//!
//! ```text
//! leafbook add-plant --name Monstera --family Araceae --age-months 14 --image monstera.jpg
//! leafbook add-leaf --id 1 --date 2024-05-17
//! leafbook leaf-stats --id 1
//! leafbook --config ~/.config/leafbook/leafbook.toml report
//! ```

mod app;
mod cli;
mod render;
mod settings;

use std::{io, process::ExitCode};

use anyhow::{Context as _, Result};
use clap::Parser;
use leafbook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use settings::Settings;

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let settings = Settings::load(&cli.config)?;
  settings.ensure_dirs()?;

  let store = SqliteStore::open(&settings.database_path).with_context(|| {
    format!("failed to open store at {}", settings.database_path.display())
  })?;
  let app = App::new(store, &settings);

  let mut stdout = io::stdout().lock();
  app.run(cli.command.unwrap_or_default(), &mut stdout)
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };

  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy(),
    )
    .init();
}
