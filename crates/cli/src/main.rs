mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reproduce_lib::{Layout, RunOptions};

use crate::output::OutputFormat;

/// reproduce - Rebuild firmware samples from pinned sources
#[derive(Parser)]
#[command(name = "reproduce")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Process only this definition file instead of discovering all of them
  #[arg(short, long)]
  path: Option<PathBuf>,

  /// Keep toolchain and environment settings across definitions
  #[arg(long)]
  shared_env: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t)]
  output: OutputFormat,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(code) => code,
    Err(e) => {
      output::print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  let layout = Layout::from_env(&cwd);
  let options = RunOptions {
    definition: cli.path,
    shared_environment: cli.shared_env,
  };
  cmd::cmd_run(layout, options, cli.output)
}
