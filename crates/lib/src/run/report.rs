use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ErrorKind, ReproduceError};

/// A recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
  pub kind: ErrorKind,
  pub message: String,
}

impl From<&ReproduceError> for Failure {
  fn from(error: &ReproduceError) -> Self {
    Self {
      kind: error.kind(),
      message: render_chain(error),
    }
  }
}

/// Render `error` followed by every cause its own message does not already include.
fn render_chain(error: &dyn std::error::Error) -> String {
  let mut message = error.to_string();
  let mut source = error.source();
  while let Some(cause) = source {
    let text = cause.to_string();
    if !message.contains(&text) {
      message.push_str(": ");
      message.push_str(&text);
    }
    source = cause.source();
  }
  message
}

/// Terminal state of one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  Succeeded { artifacts: Vec<PathBuf> },
  Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionReport {
  pub definition: PathBuf,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// Result of a whole run.
///
/// Run-level failures (such as an explicit definition path that does not
/// exist) are kept apart from per-definition outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub definitions: Vec<DefinitionReport>,
  pub run_errors: Vec<Failure>,
}

impl RunReport {
  pub fn record_success(&mut self, definition: PathBuf, artifacts: Vec<PathBuf>) {
    self.definitions.push(DefinitionReport {
      definition,
      outcome: Outcome::Succeeded { artifacts },
    });
  }

  pub fn record_failure(&mut self, definition: PathBuf, error: &ReproduceError) {
    self.definitions.push(DefinitionReport {
      definition,
      outcome: Outcome::Failed(error.into()),
    });
  }

  pub fn record_run_error(&mut self, error: &ReproduceError) {
    self.run_errors.push(error.into());
  }

  /// Every failure, in the order it happened.
  pub fn failures(&self) -> impl Iterator<Item = &Failure> {
    let definition_failures = self.definitions.iter().filter_map(|report| match &report.outcome {
      Outcome::Failed(failure) => Some(failure),
      Outcome::Succeeded { .. } => None,
    });
    self.run_errors.iter().chain(definition_failures)
  }

  /// Every error message, in the order it happened.
  pub fn errors(&self) -> Vec<&str> {
    self.failures().map(|failure| failure.message.as_str()).collect()
  }

  pub fn succeeded(&self) -> usize {
    self
      .definitions
      .iter()
      .filter(|report| matches!(report.outcome, Outcome::Succeeded { .. }))
      .count()
  }

  pub fn failed(&self) -> usize {
    self.definitions.len() - self.succeeded()
  }

  pub fn is_success(&self) -> bool {
    self.failures().next().is_none()
  }

  /// 0 when nothing failed, 1 otherwise.
  pub fn exit_code(&self) -> i32 {
    if self.is_success() { 0 } else { 1 }
  }
}
