use std::fs;

use reproduce_lib::definition::SourceSpec;
use reproduce_lib::repository::{SyncError, Synchronizer, SystemGit};
use serial_test::serial;

use super::common::{
  Upstream, Workspace, git_available, run_git, with_file_protocol, without_git_identity,
};

fn sync(
  ws: &Workspace,
  name: &str,
  url: &str,
  revision: &str,
  patches: &[&str],
) -> Result<std::path::PathBuf, SyncError> {
  let git = SystemGit;
  let repositories = ws.root().join("repositories");
  let definition_dir = ws.root().join("demo");
  fs::create_dir_all(&definition_dir).unwrap();
  let patches: Vec<String> = patches.iter().map(|p| p.to_string()).collect();
  let source = SourceSpec { name, url, revision };
  Synchronizer::new(&git, &repositories).synchronize(
    &source,
    &patches,
    &definition_dir.join("config.toml"),
    &definition_dir,
  )
}

#[test]
fn clone_checks_out_pinned_revision() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let first = upstream.commit(&[("version.txt", "1\n")], "first");
  upstream.commit(&[("version.txt", "2\n")], "second");
  let ws = Workspace::new();

  let repo = sync(&ws, "fw", &upstream.url(), &first, &[]).unwrap();

  assert_eq!(fs::read_to_string(repo.join("version.txt")).unwrap(), "1\n");
  assert_eq!(run_git(&repo, &["rev-parse", "HEAD"]), first);
}

#[test]
fn rerun_with_patch_is_idempotent() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let revision = upstream.commit(&[("hello.txt", "hello\n")], "initial");
  let ws = Workspace::new();
  ws.write_file("demo/0001-greeting.patch", &upstream.patch("hello.txt", "hello patched\n"));

  let repo = sync(&ws, "fw", &upstream.url(), &revision, &["0001-greeting.patch"]).unwrap();
  assert_eq!(fs::read_to_string(repo.join("hello.txt")).unwrap(), "hello patched\n");

  fs::write(repo.join("leftover.o"), "stale").unwrap();
  let repo = sync(&ws, "fw", &upstream.url(), &revision, &["0001-greeting.patch"]).unwrap();

  assert_eq!(fs::read_to_string(repo.join("hello.txt")).unwrap(), "hello patched\n");
  assert!(!repo.join("leftover.o").exists());
}

#[test]
#[serial]
fn existing_clone_fetches_new_revisions() {
  if !git_available() {
    return;
  }
  // The fetch moves origin/main, which writes a reflog entry, on a host
  // without any configured identity.
  without_git_identity(|| {
    let upstream = Upstream::new();
    let first = upstream.commit(&[("version.txt", "1\n")], "first");
    let ws = Workspace::new();
    sync(&ws, "fw", &upstream.url(), &first, &[]).unwrap();

    let second = upstream.commit(&[("version.txt", "2\n")], "second");
    let repo = sync(&ws, "fw", &upstream.url(), &second, &[]).unwrap();

    assert_eq!(fs::read_to_string(repo.join("version.txt")).unwrap(), "2\n");
    assert_eq!(run_git(&repo, &["rev-parse", "HEAD"]), second);
  });
}

#[test]
#[serial]
fn repinned_revision_after_many_upstream_commits() {
  if !git_available() {
    return;
  }
  without_git_identity(|| {
    let upstream = Upstream::new();
    let first = upstream.commit(&[("version.txt", "1\n")], "first");
    let ws = Workspace::new();
    sync(&ws, "fw", &upstream.url(), &first, &[]).unwrap();

    upstream.commit(&[("version.txt", "2\n")], "second");
    let third = upstream.commit(&[("version.txt", "3\n")], "third");
    sync(&ws, "fw", &upstream.url(), &third, &[]).unwrap();
    let repo = sync(&ws, "fw", &upstream.url(), &first, &[]).unwrap();

    assert_eq!(fs::read_to_string(repo.join("version.txt")).unwrap(), "1\n");
  });
}

#[test]
#[serial]
fn resync_restores_dirty_submodule_to_pinned_commit() {
  if !git_available() {
    return;
  }
  let library = Upstream::new();
  let pinned = library.commit(&[("lib.c", "int lib(void) { return 1; }\n")], "lib v1");
  let upstream = Upstream::new();
  upstream.commit(&[("main.c", "int main(void) { return 0; }\n")], "initial");
  let revision = upstream.add_submodule(&library, "lib");
  let newer = library.commit(&[("lib.c", "int lib(void) { return 2; }\n")], "lib v2");
  let ws = Workspace::new();

  with_file_protocol(|| {
    let repo = sync(&ws, "fw", &upstream.url(), &revision, &[]).unwrap();
    let submodule = repo.join("lib");
    assert_eq!(run_git(&submodule, &["rev-parse", "HEAD"]), pinned);

    run_git(&submodule, &["checkout", "--quiet", &newer]);
    fs::write(submodule.join("lib.c"), "local edit\n").unwrap();
    fs::write(submodule.join("scratch.o"), "stale").unwrap();

    let repo = sync(&ws, "fw", &upstream.url(), &revision, &[]).unwrap();
    let submodule = repo.join("lib");

    assert_eq!(run_git(&submodule, &["rev-parse", "HEAD"]), pinned);
    assert_eq!(
      fs::read_to_string(submodule.join("lib.c")).unwrap(),
      "int lib(void) { return 1; }\n"
    );
    assert!(!submodule.join("scratch.o").exists());
    assert_eq!(run_git(&submodule, &["status", "--porcelain"]), "");
  });
}

#[test]
fn different_remote_is_rejected_and_tree_untouched() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let revision = upstream.commit(&[("file.txt", "original\n")], "initial");
  let other = Upstream::new();
  other.commit(&[("file.txt", "other\n")], "initial");
  let ws = Workspace::new();
  let repo = sync(&ws, "fw", &upstream.url(), &revision, &[]).unwrap();
  fs::write(repo.join("file.txt"), "local edit\n").unwrap();

  let err = sync(&ws, "fw", &other.url(), &revision, &[]).unwrap_err();

  assert!(matches!(err, SyncError::Mismatch { .. }));
  assert_eq!(fs::read_to_string(repo.join("file.txt")).unwrap(), "local edit\n");
}

#[test]
fn unknown_revision_fails() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  upstream.commit(&[("file.txt", "x\n")], "initial");
  let ws = Workspace::new();

  let err = sync(&ws, "fw", &upstream.url(), "0000000000000000000000000000000000000000", &[]).unwrap_err();

  assert!(matches!(err, SyncError::Git { step: "reset to revision", .. }));
}
