//! Implementation of the default `reproduce` run.
//!
//! Processes every selected definition, then prints the accumulated errors and
//! a pass/fail summary.

use std::process::ExitCode;

use anyhow::Result;
use tracing::debug;

use reproduce_lib::{Layout, RunOptions, RunReport, Runner};

use crate::output::{OutputFormat, print_error, print_json, print_stat, print_success};

/// Run the pipeline and report.
///
/// Exits 0 only when no definition and no run-level step failed.
pub fn cmd_run(layout: Layout, options: RunOptions, output: OutputFormat) -> Result<ExitCode> {
  debug!(root = %layout.root().display(), "starting run");
  let report = Runner::new(layout, options).run();

  let status = report.exit_code();
  if output.is_json() {
    print_json(&report)?;
  } else {
    print_summary(&report);
    println!("Exited with status {status}");
  }
  Ok(ExitCode::from(status as u8))
}

fn print_summary(report: &RunReport) {
  println!();
  if report.is_success() {
    print_success("Build succeeded for all samples!");
  } else {
    for error in report.errors() {
      print_error(error);
    }
    print_error(&format!("Build failed with {} error(s)", report.errors().len()));
  }
  print_stat("Definitions succeeded", &report.succeeded().to_string());
  print_stat("Definitions failed", &report.failed().to_string());
}
