//! Explicit execution context threaded through the pipeline stages.
//!
//! Instead of mutating the process-wide `PATH`, environment and working
//! directory, every stage receives an [`ExecContext`] and returns an updated
//! copy. Commands are spawned with the context applied to the child only.

use std::collections::BTreeMap;
use std::env::{self, JoinPathsError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Search path, environment overrides and working directory for spawned commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecContext {
  search_path: Vec<PathBuf>,
  env: BTreeMap<String, String>,
  cwd: PathBuf,
}

impl ExecContext {
  /// Create a context with an explicit search path and no overrides.
  pub fn new(search_path: Vec<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      search_path,
      env: BTreeMap::new(),
      cwd: cwd.into(),
    }
  }

  /// Create a context inheriting the launching process `PATH`.
  pub fn inherit(cwd: impl Into<PathBuf>) -> Self {
    let search_path = env::var_os("PATH")
      .map(|path| env::split_paths(&path).collect())
      .unwrap_or_default();
    Self::new(search_path, cwd)
  }

  pub fn search_path(&self) -> &[PathBuf] {
    &self.search_path
  }

  pub fn env(&self) -> &BTreeMap<String, String> {
    &self.env
  }

  pub fn var(&self, name: &str) -> Option<&str> {
    self.env.get(name).map(String::as_str)
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  /// Whether `dir` is already part of the search path.
  pub fn has_search_path_entry(&self, dir: &Path) -> bool {
    self.search_path.iter().any(|entry| entry == dir)
  }

  /// Append `dir` to the search path unless it is already present.
  pub fn with_search_path_entry(mut self, dir: impl Into<PathBuf>) -> Self {
    let dir = dir.into();
    if !self.has_search_path_entry(&dir) {
      self.search_path.push(dir);
    }
    self
  }

  /// Set (or replace) an environment override.
  pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(name.into(), value.into());
    self
  }

  /// Change the working directory for subsequent commands.
  pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = cwd.into();
    self
  }

  /// The joined `PATH` value.
  pub fn path_var(&self) -> Result<OsString, JoinPathsError> {
    env::join_paths(&self.search_path)
  }

  /// Apply this context to a command about to be spawned.
  ///
  /// An explicit `PATH` override in the environment map wins over the search path.
  pub fn apply(&self, command: &mut Command) -> Result<(), JoinPathsError> {
    command.current_dir(&self.cwd).env("PATH", self.path_var()?);
    command.envs(&self.env);
    Ok(())
  }
}
