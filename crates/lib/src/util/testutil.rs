//! Test utilities for reproduce-lib.
//!
//! Helpers for writing definitions and a [`Git`] fake that "clones" a local
//! directory, so coordinator tests run without network or a `git` binary.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::consts::DEFINITION_FILE_NAME;
use crate::repository::{Git, GitError};

/// Write `content` as the definition file in `dir`, creating `dir`.
pub fn write_definition(dir: &Path, content: &str) {
  fs::create_dir_all(dir).unwrap();
  fs::write(dir.join(DEFINITION_FILE_NAME), content).unwrap();
}

/// Create an upstream tree with `files` and return its URL for [`FakeGit`].
pub fn write_upstream(dir: &Path, files: &[(&str, &str)]) -> String {
  fs::create_dir_all(dir).unwrap();
  for (name, content) in files {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }
  dir.to_string_lossy().to_string()
}

/// Treats URLs as local directories and copies them on clone.
///
/// The cloned URL is stored in `.git/origin` so later runs see a matching remote.
#[derive(Debug, Default)]
pub struct FakeGit {
  calls: RefCell<Vec<String>>,
}

impl FakeGit {
  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  fn record(&self, call: impl Into<String>) {
    self.calls.borrow_mut().push(call.into());
  }
}

impl Git for FakeGit {
  fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
    self.record(format!("clone {url}"));
    let upstream = Path::new(url);
    if !upstream.is_dir() {
      return Err(GitError::Clone {
        url: url.to_string(),
        source: format!("no such upstream: {url}").into(),
      });
    }
    for entry in WalkDir::new(upstream).min_depth(1) {
      let entry = entry.unwrap();
      let target = dest.join(entry.path().strip_prefix(upstream).unwrap());
      if entry.file_type().is_dir() {
        fs::create_dir_all(&target).unwrap();
      } else {
        fs::copy(entry.path(), &target).unwrap();
      }
    }
    fs::create_dir_all(dest.join(".git")).unwrap();
    fs::write(dest.join(".git/origin"), url).unwrap();
    Ok(())
  }

  fn origin_url(&self, repo: &Path) -> Result<Option<String>, GitError> {
    self.record("origin");
    Ok(fs::read_to_string(repo.join(".git/origin")).ok())
  }

  fn fetch_all(&self, _repo: &Path) -> Result<(), GitError> {
    self.record("fetch");
    Ok(())
  }

  fn reset_hard(&self, _repo: &Path, revision: &str) -> Result<(), GitError> {
    self.record(format!("reset {revision}"));
    Ok(())
  }

  fn clean_submodules(&self, _repo: &Path) -> Result<(), GitError> {
    self.record("clean-submodules");
    Ok(())
  }

  fn update_submodules(&self, _repo: &Path) -> Result<(), GitError> {
    self.record("update-submodules");
    Ok(())
  }

  fn clean(&self, _repo: &Path) -> Result<(), GitError> {
    self.record("clean");
    Ok(())
  }

  fn apply_patch(&self, _repo: &Path, patch: &Path) -> Result<(), GitError> {
    self.record(format!("apply {}", patch.display()));
    Ok(())
  }
}
