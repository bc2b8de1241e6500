//! Presentation of stored images.

use std::{io::Write as _, path::PathBuf, process::Command};

use tracing::debug;

use crate::{Error, Result, ingest::file_stem};

/// Something that can show an image to the user.
pub trait ImageViewer {
  fn display(&self, bytes: &[u8], title: &str) -> Result<()>;
}

/// Shows images by writing them to a temporary file and launching an external
/// program (e.g. `xdg-open`, `open`, `feh`) with the file path as its only
/// argument.
#[derive(Debug, Clone)]
pub struct CommandViewer {
  command: String,
  scratch: PathBuf,
}

impl CommandViewer {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      scratch: std::env::temp_dir(),
    }
  }

  /// Write scratch files somewhere other than the system temp directory.
  pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.scratch = dir.into();
    self
  }

  /// Write `bytes` to a freshly created file in the scratch directory. The
  /// file is kept so the viewer can still open it after we return.
  fn scratch_file(&self, bytes: &[u8], title: &str) -> Result<PathBuf> {
    let ext = image::guess_format(bytes)
      .ok()
      .and_then(|f| f.extensions_str().first().copied())
      .unwrap_or("img");

    let mut file = tempfile::Builder::new()
      .prefix(&format!("leafbook-{}-", file_stem(title)))
      .suffix(&format!(".{ext}"))
      .tempfile_in(&self.scratch)
      .map_err(Error::io(&self.scratch))?;
    file.write_all(bytes).map_err(Error::io(file.path()))?;

    file
      .into_temp_path()
      .keep()
      .map_err(|e| Error::io(&self.scratch)(e.error))
  }
}

impl ImageViewer for CommandViewer {
  fn display(&self, bytes: &[u8], title: &str) -> Result<()> {
    let path = self.scratch_file(bytes, title)?;
    debug!(command = %self.command, path = %path.display(), "launching viewer");

    let status = Command::new(&self.command)
      .arg(&path)
      .status()
      .map_err(|e| Error::Viewer {
        command: self.command.clone(),
        reason:  e.to_string(),
      })?;

    if !status.success() {
      return Err(Error::Viewer {
        command: self.command.clone(),
        reason:  format!("exited with {status}"),
      });
    }
    Ok(())
  }
}
