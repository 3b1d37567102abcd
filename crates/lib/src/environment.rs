//! Environment variable settings from a definition.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::context::ExecContext;

/// Errors that can occur while applying environment settings.
#[derive(Debug, Error)]
pub enum EnvironmentError {
  /// An entry does not have exactly one or two elements.
  #[error("environment config {entry:?} in: {path} must have only one or two elements per entry")]
  Arity { entry: Vec<String>, path: PathBuf },

  /// The variable name cannot be set.
  #[error("environment config {entry:?} in: {path} has an invalid variable name")]
  InvalidName { entry: Vec<String>, path: PathBuf },
}

/// Apply `settings` on top of `ctx`.
///
/// `[name, value]` sets `name` to `value`, `[name]` sets it to an empty string.
/// Every entry is validated before any is applied, so a malformed entry leaves
/// the context as it was.
pub fn prepare(settings: &[Vec<String>], origin: &Path, ctx: &ExecContext) -> Result<ExecContext, EnvironmentError> {
  if settings.is_empty() {
    warn!(path = %origin.display(), "no environment settings provided");
    return Ok(ctx.clone());
  }

  let mut pairs = Vec::with_capacity(settings.len());
  for entry in settings {
    let (name, value) = match entry.as_slice() {
      [name, value] => (name, value.as_str()),
      [name] => (name, ""),
      _ => {
        return Err(EnvironmentError::Arity {
          entry: entry.clone(),
          path: origin.to_path_buf(),
        });
      }
    };
    if !is_valid_name(name) {
      return Err(EnvironmentError::InvalidName {
        entry: entry.clone(),
        path: origin.to_path_buf(),
      });
    }
    pairs.push((name, value));
  }

  let mut next = ctx.clone();
  for (name, value) in pairs {
    debug!(name = %name, value = %value, "setting environment variable");
    next = next.with_var(name.as_str(), value);
  }
  Ok(next)
}

fn is_valid_name(name: &str) -> bool {
  !name.is_empty() && !name.contains('=') && !name.contains('\0')
}
