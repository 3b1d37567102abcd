//! Repository synchronization.
//!
//! Brings `repositories/<name>` to exactly the pinned revision:
//! - clones when the directory is absent (or empty), otherwise checks the
//!   `origin` URL and fetches every remote
//! - hard-resets to the revision
//! - resets and cleans submodules, updates them, then cleans the tree
//! - applies the definition's patches in order
//!
//! The reset and clean steps run before patches are applied so re-running a
//! definition against a tree patched by an earlier run gives the same result.

pub mod git;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::definition::SourceSpec;

pub use git::{Git, GitError, SystemGit};

/// Errors that can occur while synchronizing a repository.
#[derive(Debug, Error)]
pub enum SyncError {
  /// Failed to create the repository directory.
  #[error("failed to create repository directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The existing clone tracks a different remote.
  #[error("URLs not matching for '{path}' repository: expected {expected}, found {}", .actual.as_deref().unwrap_or("<no origin remote>"))]
  Mismatch {
    path: PathBuf,
    expected: String,
    actual: Option<String>,
  },

  /// A patch file does not exist.
  #[error("no patch: {patch} in: {dir}")]
  PatchNotFound { patch: String, dir: PathBuf },

  /// A patch did not apply.
  #[error("failed to apply patch {patch} from {definition}: {source}")]
  PatchFailed {
    patch: String,
    definition: PathBuf,
    #[source]
    source: GitError,
  },

  /// A git operation failed.
  #[error("failed to {step} in repository '{repository}': {source}")]
  Git {
    step: &'static str,
    repository: String,
    #[source]
    source: GitError,
  },
}

/// Synchronizes repositories below a root directory.
pub struct Synchronizer<'a, G: Git> {
  git: &'a G,
  repositories_dir: &'a Path,
}

impl<'a, G: Git> Synchronizer<'a, G> {
  pub fn new(git: &'a G, repositories_dir: &'a Path) -> Self {
    Self { git, repositories_dir }
  }

  /// The working tree location for `name`.
  pub fn repo_dir(&self, name: &str) -> PathBuf {
    self.repositories_dir.join(name)
  }

  /// Synchronize `source` and apply `patches` (relative to `definition_dir`).
  ///
  /// Returns the repository directory.
  pub fn synchronize(
    &self,
    source: &SourceSpec<'_>,
    patches: &[String],
    definition: &Path,
    definition_dir: &Path,
  ) -> Result<PathBuf, SyncError> {
    let patch_paths = resolve_patches(patches, definition_dir)?;
    let path = self.repo_dir(source.name);
    let git_err = |step: &'static str| {
      move |e: GitError| SyncError::Git {
        step,
        repository: source.name.to_string(),
        source: e,
      }
    };

    if needs_clone(&path) {
      debug!(repository = source.name, "creating repository directory");
      fs::create_dir_all(&path).map_err(|e| SyncError::CreateDir {
        path: path.clone(),
        source: e,
      })?;
      info!(repository = source.name, url = source.url, path = %path.display(), "cloning repository");
      self.git.clone_repo(source.url, &path).map_err(git_err("clone"))?;
    } else {
      warn!(path = %path.display(), "repository already exists");
      let actual = self.git.origin_url(&path).map_err(git_err("read origin URL"))?;
      if actual.as_deref() != Some(source.url) {
        return Err(SyncError::Mismatch {
          path,
          expected: source.url.to_string(),
          actual,
        });
      }
      debug!(repository = source.name, "fetching remotes");
      self.git.fetch_all(&path).map_err(git_err("fetch"))?;
    }

    debug!(repository = source.name, revision = source.revision, "checking out revision");
    self
      .git
      .reset_hard(&path, source.revision)
      .map_err(git_err("reset to revision"))?;
    self.git.clean_submodules(&path).map_err(git_err("clean submodules"))?;
    self.git.update_submodules(&path).map_err(git_err("update submodules"))?;
    self.git.clean(&path).map_err(git_err("clean"))?;

    for (patch, patch_path) in patches.iter().zip(&patch_paths) {
      debug!(repository = source.name, patch = %patch, "applying patch");
      self
        .git
        .apply_patch(&path, patch_path)
        .map_err(|e| SyncError::PatchFailed {
          patch: patch.clone(),
          definition: definition.to_path_buf(),
          source: e,
        })?;
    }

    info!(repository = source.name, definition = %definition.display(), "repository configured");
    Ok(path)
  }
}

/// An absent or empty directory is cloned into; anything else is reused.
fn needs_clone(path: &Path) -> bool {
  match fs::read_dir(path) {
    Ok(mut entries) => entries.next().is_none(),
    Err(_) => !path.exists(),
  }
}

fn resolve_patches(patches: &[String], definition_dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
  patches
    .iter()
    .map(|patch| {
      let path = definition_dir.join(patch);
      if path.is_file() {
        Ok(dunce::canonicalize(&path).unwrap_or(path))
      } else {
        Err(SyncError::PatchNotFound {
          patch: patch.clone(),
          dir: definition_dir.to_path_buf(),
        })
      }
    })
    .collect()
}
