use std::path::{Path, PathBuf};

use tracing::warn;

use crate::consts::{ARTIFACTS_DIR_NAME, REPOSITORIES_DIR_NAME, ROOT_ENV_VAR};

/// Directory layout of a run.
///
/// ```text
/// <root>/
///   repositories/<repository_name>/   working trees, reused across runs
///   artifacts/<definition dir>/       collected outputs
///   <any>/config.toml                 definitions
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  root: PathBuf,
}

impl Layout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let root = dunce::canonicalize(&root).unwrap_or(root);
    Self { root }
  }

  /// The run root from `REPRODUCE_ROOT`, falling back to `cwd`.
  pub fn from_env(cwd: &Path) -> Self {
    match std::env::var_os(ROOT_ENV_VAR) {
      Some(root) if !root.is_empty() => Self::new(cwd.join(root)),
      _ => Self::new(cwd),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn repositories_dir(&self) -> PathBuf {
    self.root.join(REPOSITORIES_DIR_NAME)
  }

  pub fn artifacts_dir(&self) -> PathBuf {
    self.root.join(ARTIFACTS_DIR_NAME)
  }

  /// Output directory mirroring `definition_dir` below the artifacts root.
  ///
  /// Definitions outside the run root are placed under their directory name.
  pub fn artifact_dir_for(&self, definition_dir: &Path) -> PathBuf {
    let definition_dir = dunce::canonicalize(definition_dir).unwrap_or_else(|_| definition_dir.to_path_buf());
    match definition_dir.strip_prefix(&self.root) {
      Ok(relative) => self.artifacts_dir().join(relative),
      Err(_) => {
        warn!(
          path = %definition_dir.display(),
          "definition is outside the run root, using its directory name for artifacts"
        );
        let name = definition_dir.file_name().map(PathBuf::from).unwrap_or_default();
        self.artifacts_dir().join(name)
      }
    }
  }
}
