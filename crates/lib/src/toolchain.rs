//! Toolchain resolution.
//!
//! Definitions name a toolchain; the name is looked up in a fixed table and the
//! mapped installation directory is appended to the command search path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::context::ExecContext;

/// Errors that can occur while resolving a toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The name is not in the toolchain table.
  #[error("unsupported toolchain '{name}' (known toolchains: {known})")]
  Unsupported { name: String, known: String },

  /// The name is known but its directory is missing.
  #[error("toolchain '{name}' is not installed: '{path}' does not exist")]
  NotInstalled { name: String, path: PathBuf },
}

/// Fixed mapping from toolchain name to installation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainTable {
  entries: BTreeMap<String, PathBuf>,
}

impl ToolchainTable {
  /// Build a table from explicit entries.
  pub fn new<N, P>(entries: impl IntoIterator<Item = (N, P)>) -> Self
  where
    N: Into<String>,
    P: Into<PathBuf>,
  {
    Self {
      entries: entries
        .into_iter()
        .map(|(name, path)| (name.into(), path.into()))
        .collect(),
    }
  }

  /// The toolchains installed on build hosts.
  pub fn builtin() -> Self {
    Self::new([
      ("arm-none-eabi", "/opt/gcc-arm-none-eabi/bin"),
      ("zephyr-sdk", "/opt/zephyr-sdk"),
      ("riscv-unknown-elf-gcc", "/opt/riscv-unknown-elf-gcc/bin"),
    ])
  }

  pub fn get(&self, name: &str) -> Option<&Path> {
    self.entries.get(name).map(PathBuf::as_path)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }
}

impl Default for ToolchainTable {
  fn default() -> Self {
    Self::builtin()
  }
}

/// Resolve `name` and return a context with its directory on the search path.
///
/// `None` means the definition needs no toolchain and the context is returned unchanged.
pub fn prepare(name: Option<&str>, table: &ToolchainTable, ctx: &ExecContext) -> Result<ExecContext, ToolchainError> {
  let Some(name) = name else {
    debug!("skipping toolchain configuration");
    return Ok(ctx.clone());
  };

  let path = table.get(name).ok_or_else(|| ToolchainError::Unsupported {
    name: name.to_string(),
    known: table.names().collect::<Vec<_>>().join(", "),
  })?;

  if !path.exists() {
    return Err(ToolchainError::NotInstalled {
      name: name.to_string(),
      path: path.to_path_buf(),
    });
  }

  if ctx.has_search_path_entry(path) {
    debug!(toolchain = name, path = %path.display(), "toolchain already on PATH");
  } else {
    debug!(toolchain = name, path = %path.display(), "adding toolchain to PATH");
  }

  Ok(ctx.clone().with_search_path_entry(path))
}
