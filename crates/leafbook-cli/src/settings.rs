//! Runtime configuration, read from an optional TOML file and `LEAFBOOK_*`
//! environment variables.

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::Deserialize;

/// Storage locations and external programs used by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path:  PathBuf,
  /// Where normalised plant photos are written.
  pub image_dir:      PathBuf,
  /// Where reports and CSV exports are written.
  pub report_dir:     PathBuf,
  /// Program launched with an image path by `show-image`.
  pub viewer_command: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path:  PathBuf::from("data/plants.db"),
      image_dir:      PathBuf::from("data/images"),
      report_dir:     PathBuf::from("data/reports"),
      viewer_command: "xdg-open".to_owned(),
    }
  }
}

impl Settings {
  /// Layer defaults, the config file at `path` (if it exists) and the
  /// environment, in increasing order of precedence.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LEAFBOOK"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;

    Ok(settings.expanded())
  }

  fn expanded(self) -> Self {
    Self {
      database_path: expand_tilde(&self.database_path),
      image_dir: expand_tilde(&self.image_dir),
      report_dir: expand_tilde(&self.report_dir),
      viewer_command: self.viewer_command,
    }
  }

  /// Create the data directories if they are missing.
  pub fn ensure_dirs(&self) -> anyhow::Result<()> {
    let db_dir = self.database_path.parent().filter(|p| !p.as_os_str().is_empty());
    for dir in db_dir.into_iter().chain([self.image_dir.as_path(), self.report_dir.as_path()]) {
      fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(())
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
