//! Prebuild and sample execution.
//!
//! Prebuild commands run from the repository root. Each sample then runs its
//! build commands inside its own directory and, once they all succeed, has its
//! artifacts collected into the definition's output directory.

pub mod artifacts;
pub mod cmd;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::context::ExecContext;
use crate::definition::Sample;

pub use artifacts::{ArtifactError, collect, ensure_dir};
pub use cmd::{CommandError, run_all, run_shell};

/// Errors that can occur while building a sample.
#[derive(Debug, Error)]
pub enum SampleError {
  /// A build command failed.
  #[error("build command failed in: {definition}, {source}")]
  Command {
    definition: PathBuf,
    #[source]
    source: CommandError,
  },

  /// Artifact collection failed.
  #[error(transparent)]
  Artifact(#[from] ArtifactError),
}

/// Run every prebuild command from `repo_dir`, stopping at the first failure.
pub fn run_prebuild(commands: &[String], repo_dir: &Path, ctx: &ExecContext) -> Result<(), CommandError> {
  if commands.is_empty() {
    debug!("no prebuild commands, nothing to do");
    return Ok(());
  }
  run_all(commands, &ctx.clone().with_cwd(repo_dir))
}

/// Build one sample and collect its artifacts.
///
/// Returns the paths of the collected artifacts.
pub fn build_sample(
  sample: &Sample,
  repo_dir: &Path,
  output_dir: &Path,
  definition: &Path,
  ctx: &ExecContext,
) -> Result<Vec<PathBuf>, SampleError> {
  let sample_dir = repo_dir.join(&sample.directory);
  let sample_ctx = ctx.clone().with_cwd(&sample_dir);

  run_all(&sample.build_commands, &sample_ctx).map_err(|source| SampleError::Command {
    definition: definition.to_path_buf(),
    source,
  })?;

  let collected = collect(&sample.artifacts, &sample_dir, output_dir)?;
  info!(path = %sample_dir.display(), "build succeeded");
  Ok(collected)
}
