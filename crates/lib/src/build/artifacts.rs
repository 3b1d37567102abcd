//! Artifact collection.
//!
//! Copies the files named by a sample's manifest from the sample directory into
//! the definition's output directory. Required entries are checked up front so
//! a sample with a missing required artifact copies nothing.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::definition::{Artifact, ArtifactEntry};

/// Errors that can occur while collecting artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
  /// A required artifact was not produced by the build.
  #[error("binary: {path} does not exist. Wrong name?")]
  Missing { path: PathBuf },

  /// Creating a directory in the output tree failed.
  #[error("failed to create artifact directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Copying an artifact failed.
  #[error("failed to copy '{from}' to '{to}': {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Create `dir` and its parents; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<(), ArtifactError> {
  fs::create_dir_all(dir).map_err(|source| ArtifactError::CreateDir {
    path: dir.to_path_buf(),
    source,
  })
}

/// Copy the artifacts of `entries` from `source_dir` into `output_dir`.
///
/// Returns the destination paths that were written.
pub fn collect(entries: &[ArtifactEntry], source_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
  let artifacts: Vec<Artifact<'_>> = entries.iter().map(ArtifactEntry::artifact).collect();

  if let Some(missing) = artifacts
    .iter()
    .filter(|artifact| artifact.required)
    .map(|artifact| source_dir.join(artifact.source))
    .find(|path| !path.is_file())
  {
    return Err(ArtifactError::Missing { path: missing });
  }

  let mut copied = Vec::with_capacity(artifacts.len());
  for artifact in &artifacts {
    let from = source_dir.join(artifact.source);
    if !from.is_file() {
      debug!(path = %from.display(), "optional artifact not produced, skipping");
      continue;
    }

    let to = output_dir.join(artifact.destination);
    if let Some(parent) = to.parent() {
      ensure_dir(parent)?;
    }

    fs::copy(&from, &to).map_err(|source| ArtifactError::Copy {
      from: from.clone(),
      to: to.clone(),
      source,
    })?;
    info!(from = %from.display(), to = %to.display(), "collected artifact");
    copied.push(to);
  }
  Ok(copied)
}
