//! Types that make up a definition document.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// A buildable unit inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sample {
  /// Directory relative to the repository root where build commands run.
  pub directory: String,
  /// Shell commands, run in order.
  #[serde(default)]
  pub build_commands: Vec<String>,
  /// Files to collect once every build command succeeded.
  #[serde(default)]
  pub artifacts: Vec<ArtifactEntry>,
}

/// One entry of a sample's artifact manifest as written in the document.
///
/// A bare string is collected under the same relative name and must exist.
/// A table renames the file and is skipped when the source is absent, unless
/// `required = true` is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, expecting = "expected mapping or string")]
pub enum ArtifactEntry {
  Path(String),
  Rename(RenameArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameArtifact {
  pub from: String,
  pub to: String,
  #[serde(default)]
  pub required: bool,
}

/// An artifact entry with its copy policy made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<'a> {
  pub source: &'a str,
  pub destination: &'a str,
  pub required: bool,
}

impl ArtifactEntry {
  pub fn artifact(&self) -> Artifact<'_> {
    match self {
      ArtifactEntry::Path(path) => Artifact {
        source: path,
        destination: path,
        required: true,
      },
      ArtifactEntry::Rename(rename) => Artifact {
        source: &rename.from,
        destination: &rename.to,
        required: rename.required,
      },
    }
  }
}

/// The validated repository coordinates of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec<'a> {
  /// Directory name under the repositories root.
  pub name: &'a str,
  /// Remote URL, compared verbatim against an existing clone's `origin`.
  pub url: &'a str,
  /// Commit to hard-reset to.
  pub revision: &'a str,
}

/// Whether `path` is relative and stays below the directory it is joined to.
pub(crate) fn is_contained(path: &str) -> bool {
  !path.is_empty()
    && Path::new(path)
      .components()
      .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
