use std::fs;

use reproduce_lib::run::Outcome;
use reproduce_lib::{ErrorKind, RunOptions};

use super::common::{Upstream, Workspace, git_available};

fn definition(name: &str, url: &str, revision: &str, body: &str) -> String {
  format!(
    r#"repository_name = "{name}"
git_url = "{url}"
commit_sha = "{revision}"
{body}"#
  )
}

#[test]
fn failed_sync_does_not_block_next_definition() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let revision = upstream.commit(&[("app/main.c", "int main(void) { return 0; }\n")], "initial");
  let ws = Workspace::new();
  let missing = ws.root().join("no-such-upstream");
  ws.write_file(
    "a_broken/config.toml",
    &definition("broken", &missing.to_string_lossy(), &revision, ""),
  );
  ws.write_file(
    "b_board/config.toml",
    &definition(
      "board",
      &upstream.url(),
      &revision,
      r#"
[[samples]]
directory = "app"
build_commands = ["cp main.c firmware.bin"]
artifacts = ["firmware.bin", { from = "firmware.map", to = "firmware.map" }]
"#,
    ),
  );

  let report = ws.runner(RunOptions::default()).run();

  assert_eq!(report.exit_code(), 1);
  let errors = report.errors();
  assert_eq!(errors.len(), 1, "{errors:?}");
  assert!(errors[0].contains("broken"));
  assert!(matches!(
    &report.definitions[0].outcome,
    Outcome::Failed(failure) if failure.kind == ErrorKind::RepositoryOperationFailed
  ));
  assert!(ws.root().join("artifacts/b_board/firmware.bin").exists());
  assert!(!ws.root().join("artifacts/b_board/firmware.map").exists());
}

#[test]
fn prebuild_and_environment_reach_sample_commands() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let revision = upstream.commit(&[("README", "board\n")], "initial");
  let ws = Workspace::new();
  ws.write_file(
    "vendor/board/config.toml",
    &definition(
      "board",
      &upstream.url(),
      &revision,
      r#"env_settings = [["BOARD", "nrf52"], ["EMPTY"]]
prebuild_commands = ["mkdir -p out", "echo prebuilt > out/stamp"]

[[samples]]
directory = "out"
build_commands = ["printf '%s|%s' \"$BOARD\" \"$EMPTY\" > board.txt"]
artifacts = ["stamp", { from = "board.txt", to = "info/board.txt", required = true }]
"#,
    ),
  );

  let report = ws.runner(RunOptions::default()).run();

  assert!(report.is_success(), "{:?}", report.errors());
  let artifacts = ws.root().join("artifacts/vendor/board");
  assert_eq!(fs::read_to_string(artifacts.join("stamp")).unwrap().trim(), "prebuilt");
  assert_eq!(fs::read_to_string(artifacts.join("info/board.txt")).unwrap(), "nrf52|");
}

#[test]
fn missing_required_artifact_fails_definition() {
  if !git_available() {
    return;
  }
  let upstream = Upstream::new();
  let revision = upstream.commit(&[("README", "x\n")], "initial");
  let ws = Workspace::new();
  ws.write_file(
    "demo/config.toml",
    &definition(
      "demo",
      &upstream.url(),
      &revision,
      r#"
[[samples]]
directory = "."
build_commands = ["true"]
artifacts = ["out.bin"]
"#,
    ),
  );

  let report = ws.runner(RunOptions::default()).run();

  assert!(matches!(
    &report.definitions[0].outcome,
    Outcome::Failed(failure) if failure.kind == ErrorKind::ArtifactMissing
      && failure.message.contains("out.bin")
  ));
  assert!(ws.repository("demo").join("README").exists());
}
