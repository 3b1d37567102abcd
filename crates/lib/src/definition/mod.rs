//! Definition documents.
//!
//! A definition is a `config.toml` describing one reproduction: where the
//! sources live, which commit to build, which patches and environment to
//! apply, and which samples to build and collect.
//!
//! ```toml
//! repository_name = "zephyr"
//! git_url = "https://github.com/zephyrproject-rtos/zephyr.git"
//! commit_sha = "0d2a3f5c7e1b9f8a6d4c2b0e8f6a4c2e0b9d7f5a"
//! patches = ["0001-fix-linker-script.patch"]
//! env_settings = [["ZEPHYR_TOOLCHAIN_VARIANT", "zephyr"], ["BOARD_OVERRIDE"]]
//! toolchain = "zephyr-sdk"
//! prebuild_commands = ["./scripts/bootstrap.sh"]
//!
//! [[samples]]
//! directory = "samples/hello_world"
//! build_commands = ["cmake -B build .", "make -C build"]
//! artifacts = ["build/zephyr/zephyr.elf", { from = "build/zephyr/zephyr.bin", to = "hello.bin" }]
//! ```

mod types;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) use types::is_contained;
pub use types::{Artifact, ArtifactEntry, RenameArtifact, Sample, SourceSpec};

/// Errors that make a definition unusable.
#[derive(Debug, Error)]
pub enum DefinitionError {
  /// The definition file could not be read.
  #[error("failed to read definition '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The document is not valid TOML or does not match the schema.
  #[error("invalid definition '{path}': {message}")]
  Parse { path: PathBuf, message: String },

  /// A mandatory field is absent or empty.
  #[error("empty {field} in: {path}")]
  MissingField { field: &'static str, path: PathBuf },

  /// A path field points outside the directory it is resolved against.
  #[error("{field} '{value}' in '{path}' must be a relative path inside its directory")]
  EscapingPath {
    field: &'static str,
    value: String,
    path: PathBuf,
  },
}

/// The document as authored; every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
  repository_name: Option<String>,
  git_url: Option<String>,
  commit_sha: Option<String>,
  #[serde(default)]
  patches: Vec<String>,
  #[serde(default)]
  env_settings: Vec<Vec<String>>,
  toolchain: Option<String>,
  #[serde(default)]
  samples: Vec<Sample>,
  #[serde(default)]
  prebuild_commands: Vec<String>,
}

/// One loaded definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
  pub path: PathBuf,
  pub repository_name: Option<String>,
  pub git_url: Option<String>,
  pub commit_sha: Option<String>,
  /// Patch files relative to the definition's directory.
  pub patches: Vec<String>,
  /// `[name, value]` or `[name]` entries; shape is checked when applied.
  pub env_settings: Vec<Vec<String>>,
  pub toolchain: Option<String>,
  pub samples: Vec<Sample>,
  pub prebuild_commands: Vec<String>,
}

impl Definition {
  /// Read and parse the definition at `path`.
  pub fn load(path: &Path) -> Result<Self, DefinitionError> {
    let content = fs::read_to_string(path).map_err(|source| DefinitionError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(path, &content)
  }

  /// Parse `content` as the definition located at `path`.
  pub fn parse(path: &Path, content: &str) -> Result<Self, DefinitionError> {
    let document: Document = toml::from_str(content).map_err(|e| DefinitionError::Parse {
      path: path.to_path_buf(),
      message: e.to_string().trim_end().to_string(),
    })?;

    let definition = Definition {
      path: path.to_path_buf(),
      repository_name: document.repository_name,
      git_url: document.git_url,
      commit_sha: document.commit_sha,
      patches: document.patches,
      env_settings: document.env_settings,
      toolchain: document.toolchain,
      samples: document.samples,
      prebuild_commands: document.prebuild_commands,
    };
    definition.check_paths()?;
    Ok(definition)
  }

  /// The directory holding the definition; patches resolve against it.
  pub fn dir(&self) -> &Path {
    self.path.parent().unwrap_or(Path::new(""))
  }

  /// Repository coordinates, failing on the first missing mandatory field.
  pub fn source(&self) -> Result<SourceSpec<'_>, DefinitionError> {
    let name = self.require("repository_name", self.repository_name.as_deref())?;
    let revision = self.require("commit_sha", self.commit_sha.as_deref())?;
    let url = self.require("git_url", self.git_url.as_deref())?;
    Ok(SourceSpec { name, url, revision })
  }

  fn require<'a>(&self, field: &'static str, value: Option<&'a str>) -> Result<&'a str, DefinitionError> {
    match value {
      Some(value) if !value.trim().is_empty() => Ok(value),
      _ => Err(DefinitionError::MissingField {
        field,
        path: self.path.clone(),
      }),
    }
  }

  fn check_paths(&self) -> Result<(), DefinitionError> {
    if let Some(name) = self.repository_name.as_deref() {
      if !name.is_empty() && !is_contained(name) {
        return Err(self.escaping("repository_name", name));
      }
    }
    for sample in &self.samples {
      if !sample.directory.is_empty() && !is_contained(&sample.directory) {
        return Err(self.escaping("sample directory", &sample.directory));
      }
      for entry in &sample.artifacts {
        let destination = entry.artifact().destination;
        if !is_contained(destination) {
          return Err(self.escaping("artifact destination", destination));
        }
      }
    }
    Ok(())
  }

  fn escaping(&self, field: &'static str, value: &str) -> DefinitionError {
    DefinitionError::EscapingPath {
      field,
      value: value.to_string(),
      path: self.path.clone(),
    }
  }
}
