//! Pipeline-level errors.
//!
//! Each stage has its own error type; [`ReproduceError`] wraps them so the
//! coordinator can record any failure and classify it with [`ErrorKind`].

use serde::Serialize;
use thiserror::Error;

use crate::build::{ArtifactError, CommandError, SampleError};
use crate::definition::DefinitionError;
use crate::discover::DiscoverError;
use crate::environment::EnvironmentError;
use crate::repository::SyncError;
use crate::toolchain::ToolchainError;

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// A definition is missing or has a malformed field.
  ConfigurationInvalid,
  /// The requested toolchain is unknown or not installed.
  ToolchainUnavailable,
  /// An existing clone tracks a different remote.
  RepositoryMismatch,
  /// Clone, fetch, reset, submodule or patch operation failed.
  RepositoryOperationFailed,
  /// A prebuild or build command failed or could not be started.
  CommandFailed,
  /// A required artifact was not produced.
  ArtifactMissing,
  /// The output tree could not be written.
  Filesystem,
}

/// Any failure that abandons a definition.
#[derive(Debug, Error)]
pub enum ReproduceError {
  #[error(transparent)]
  Definition(#[from] DefinitionError),

  #[error(transparent)]
  Discover(#[from] DiscoverError),

  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  #[error(transparent)]
  Sync(#[from] SyncError),

  #[error(transparent)]
  Environment(#[from] EnvironmentError),

  #[error("prebuild command failed: {0}")]
  Prebuild(#[source] CommandError),

  #[error(transparent)]
  Sample(#[from] SampleError),

  #[error(transparent)]
  Artifact(#[from] ArtifactError),
}

impl ReproduceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ReproduceError::Definition(_) | ReproduceError::Discover(_) | ReproduceError::Environment(_) => {
        ErrorKind::ConfigurationInvalid
      }
      ReproduceError::Toolchain(_) => ErrorKind::ToolchainUnavailable,
      ReproduceError::Sync(SyncError::Mismatch { .. }) => ErrorKind::RepositoryMismatch,
      ReproduceError::Sync(SyncError::PatchNotFound { .. }) => ErrorKind::ConfigurationInvalid,
      ReproduceError::Sync(SyncError::CreateDir { .. }) => ErrorKind::Filesystem,
      ReproduceError::Sync(SyncError::PatchFailed { .. } | SyncError::Git { .. }) => {
        ErrorKind::RepositoryOperationFailed
      }
      ReproduceError::Prebuild(_) | ReproduceError::Sample(SampleError::Command { .. }) => ErrorKind::CommandFailed,
      ReproduceError::Sample(SampleError::Artifact(e)) | ReproduceError::Artifact(e) => artifact_kind(e),
    }
  }
}

fn artifact_kind(error: &ArtifactError) -> ErrorKind {
  match error {
    ArtifactError::Missing { .. } => ErrorKind::ArtifactMissing,
    ArtifactError::CreateDir { .. } | ArtifactError::Copy { .. } => ErrorKind::Filesystem,
  }
}
