//! Git operations used by repository synchronization.
//!
//! [`SystemGit`] clones and inspects remotes through `gix`. Fetching and the
//! tree-level operations (hard reset, recursive submodule maintenance, clean,
//! patch application) go through the `git` executable, which writes reflog
//! entries with a default identity when none is configured.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors raised by a [`Git`] implementation.
#[derive(Debug, Error)]
pub enum GitError {
  /// Failed to clone a repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to open an existing repository.
  #[error("failed to open repository at '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: Box<gix::open::Error>,
  },

  /// The `git` executable could not be started.
  #[error("failed to run git {args}: {source}")]
  Spawn {
    args: String,
    #[source]
    source: std::io::Error,
  },

  /// The `git` executable exited unsuccessfully.
  #[error("git {args} failed with exit code {code:?}: {stderr}")]
  Command {
    args: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// The git operations repository synchronization is built from.
pub trait Git {
  /// Clone `url` into the empty directory `dest`.
  fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

  /// The configured URL of the `origin` remote, if any.
  fn origin_url(&self, repo: &Path) -> Result<Option<String>, GitError>;

  /// Fetch every configured remote.
  fn fetch_all(&self, repo: &Path) -> Result<(), GitError>;

  /// Hard-reset the working tree to `revision`.
  fn reset_hard(&self, repo: &Path, revision: &str) -> Result<(), GitError>;

  /// Recursively reset and clean every submodule.
  fn clean_submodules(&self, repo: &Path) -> Result<(), GitError>;

  /// Recursively initialize and update submodules to the checked-out revision.
  fn update_submodules(&self, repo: &Path) -> Result<(), GitError>;

  /// Remove untracked and ignored files and directories.
  fn clean(&self, repo: &Path) -> Result<(), GitError>;

  /// Apply `patch` to the working tree.
  fn apply_patch(&self, repo: &Path, patch: &Path) -> Result<(), GitError>;
}

/// [`Git`] backed by `gix` and the system `git` executable.
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl Git for SystemGit {
  fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
    let mut prepared = gix::prepare_clone(url, dest).map_err(|e| GitError::Clone {
      url: url.to_string(),
      source: Box::new(e),
    })?;

    let (mut checkout, _outcome) = prepared
      .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
      .map_err(|e| GitError::Clone {
        url: url.to_string(),
        source: Box::new(e),
      })?;

    checkout
      .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
      .map_err(|e| GitError::Clone {
        url: url.to_string(),
        source: Box::new(e),
      })?;

    Ok(())
  }

  fn origin_url(&self, repo: &Path) -> Result<Option<String>, GitError> {
    let repo = open(repo)?;
    let url = repo
      .config_snapshot()
      .string("remote.origin.url")
      .map(|url| url.to_string());
    Ok(url)
  }

  fn fetch_all(&self, repo: &Path) -> Result<(), GitError> {
    run_git(repo, &["fetch", "--all"])
  }

  fn reset_hard(&self, repo: &Path, revision: &str) -> Result<(), GitError> {
    run_git(repo, &["reset", "--hard", revision])
  }

  fn clean_submodules(&self, repo: &Path) -> Result<(), GitError> {
    run_git(repo, &["submodule", "foreach", "--recursive", "git", "reset", "--hard"])?;
    run_git(repo, &["submodule", "foreach", "--recursive", "git", "clean", "-fxd"])
  }

  fn update_submodules(&self, repo: &Path) -> Result<(), GitError> {
    run_git(repo, &["submodule", "update", "--init", "--recursive"])
  }

  fn clean(&self, repo: &Path) -> Result<(), GitError> {
    run_git(repo, &["clean", "-fxd"])
  }

  fn apply_patch(&self, repo: &Path, patch: &Path) -> Result<(), GitError> {
    let patch = patch.to_string_lossy();
    run_git(repo, &["apply", patch.as_ref()])
  }
}

fn open(path: &Path) -> Result<gix::Repository, GitError> {
  gix::open(path).map_err(|e| GitError::Open {
    path: path.to_path_buf(),
    source: Box::new(e),
  })
}

/// Run `git` with `args` inside `repo`, capturing stderr for the error message.
fn run_git(repo: &Path, args: &[&str]) -> Result<(), GitError> {
  let joined = args.join(" ");
  debug!(repo = %repo.display(), args = %joined, "running git");

  let output = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .map_err(|source| GitError::Spawn {
      args: joined.clone(),
      source,
    })?;

  if !output.status.success() {
    return Err(GitError::Command {
      args: joined,
      code: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }
  Ok(())
}
