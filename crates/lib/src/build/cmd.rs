//! Shell command execution.
//!
//! Commands run through the platform shell with the [`ExecContext`] applied to
//! the child: its search path becomes `PATH`, its overrides are added to the
//! inherited environment and its directory becomes the working directory.
//! Output streams straight to the terminal.

use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::context::ExecContext;

/// Errors that can occur while running a shell command.
#[derive(Debug, Error)]
pub enum CommandError {
  /// The shell could not be started.
  #[error("failed to run command '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// The command exited unsuccessfully.
  #[error("command '{cmd}' failed with status {}", display_code(.code))]
  Failed { cmd: String, code: Option<i32> },

  /// The search path contains an entry that cannot be joined into `PATH`.
  #[error("invalid search path for command '{cmd}': {source}")]
  SearchPath {
    cmd: String,
    #[source]
    source: std::env::JoinPathsError,
  },
}

fn display_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    None => "signal".to_string(),
  }
}

/// Run `cmd` through the shell and wait for it to exit.
pub fn run_shell(cmd: &str, ctx: &ExecContext) -> Result<(), CommandError> {
  info!(cmd = %cmd, cwd = %ctx.cwd().display(), "running command");

  let (shell, shell_args) = get_shell();
  let mut command = Command::new(shell);
  command.args(shell_args).arg(cmd);
  ctx.apply(&mut command).map_err(|source| CommandError::SearchPath {
    cmd: cmd.to_string(),
    source,
  })?;

  debug!(shell, "spawning process");

  let status = command.status().map_err(|source| CommandError::Spawn {
    cmd: cmd.to_string(),
    source,
  })?;

  if !status.success() {
    return Err(CommandError::Failed {
      cmd: cmd.to_string(),
      code: status.code(),
    });
  }
  Ok(())
}

/// Run `commands` in order, stopping at the first failure.
pub fn run_all(commands: &[String], ctx: &ExecContext) -> Result<(), CommandError> {
  for cmd in commands {
    run_shell(cmd, ctx)?;
  }
  Ok(())
}

/// The shell binary and the flag that passes it a command string.
fn get_shell() -> (&'static str, &'static [&'static str]) {
  #[cfg(unix)]
  {
    ("/bin/sh", &["-c"])
  }

  #[cfg(windows)]
  {
    ("cmd.exe", &["/C"])
  }
}
