//! Locating definition files.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::consts::{DEFINITION_FILE_NAME, RESERVED_DIRS};

/// Errors that can occur while locating definitions.
#[derive(Debug, Error)]
pub enum DiscoverError {
  /// An explicitly requested definition does not exist.
  #[error("config file was not found in provided path: {0}")]
  NotFound(PathBuf),
}

/// Select the definitions to process.
///
/// With an explicit path only that file is used (resolved against `root` when
/// relative); otherwise every definition below `root` is discovered.
pub fn select(root: &Path, explicit: Option<&Path>) -> Result<Vec<PathBuf>, DiscoverError> {
  match explicit {
    Some(path) => {
      let path = root.join(path);
      if path.is_file() {
        info!(path = %path.display(), "using provided config");
        Ok(vec![path])
      } else {
        Err(DiscoverError::NotFound(path))
      }
    }
    None => Ok(discover(root)),
  }
}

/// Recursively find every definition below `root`, skipping reserved top-level directories.
///
/// Results are ordered by path so runs are deterministic.
pub fn discover(root: &Path) -> Vec<PathBuf> {
  debug!(root = %root.display(), "looking for configs");

  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| !is_reserved(entry));

  let mut found = Vec::new();
  for entry in walker {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        warn!(error = %e, "skipping unreadable entry");
        continue;
      }
    };

    if entry.file_type().is_file() && entry.file_name() == DEFINITION_FILE_NAME {
      info!(path = %entry.path().display(), "found config");
      found.push(entry.into_path());
    }
  }
  found
}

fn is_reserved(entry: &DirEntry) -> bool {
  entry.depth() == 1
    && entry.file_type().is_dir()
    && entry
      .file_name()
      .to_str()
      .map(|name| RESERVED_DIRS.contains(&name))
      .unwrap_or(false)
}
