//! Run coordination.
//!
//! Every selected definition walks the same stages:
//!
//! ```text
//! load -> toolchain -> repository -> environment -> output dir -> prebuild -> samples
//! ```
//!
//! The first failing stage abandons the definition; the failure is logged,
//! recorded in the [`RunReport`], and the run moves on to the next definition.
//! Nothing is retried and nothing is rolled back.

mod report;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::build::{self, ensure_dir};
use crate::context::ExecContext;
use crate::definition::Definition;
use crate::discover;
use crate::environment;
use crate::error::ReproduceError;
use crate::layout::Layout;
use crate::repository::{Git, Synchronizer, SystemGit};
use crate::toolchain::{self, ToolchainTable};

pub use report::{DefinitionReport, Failure, Outcome, RunReport};

/// Options controlling a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Process only this definition instead of discovering all of them.
  pub definition: Option<PathBuf>,
  /// Let toolchain and environment settings accumulate across definitions
  /// instead of starting each definition from the inherited environment.
  pub shared_environment: bool,
}

/// Processes definitions under a [`Layout`].
pub struct Runner<G: Git = SystemGit> {
  layout: Layout,
  toolchains: ToolchainTable,
  git: G,
  options: RunOptions,
}

impl Runner<SystemGit> {
  pub fn new(layout: Layout, options: RunOptions) -> Self {
    Self::with_git(layout, options, SystemGit)
  }
}

impl<G: Git> Runner<G> {
  pub fn with_git(layout: Layout, options: RunOptions, git: G) -> Self {
    Self {
      layout,
      toolchains: ToolchainTable::builtin(),
      git,
      options,
    }
  }

  /// Replace the built-in toolchain table.
  pub fn with_toolchains(mut self, toolchains: ToolchainTable) -> Self {
    self.toolchains = toolchains;
    self
  }

  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  /// Process every selected definition and report the outcome of each.
  pub fn run(&self) -> RunReport {
    let mut report = RunReport::default();
    let root = self.layout.root();

    let definitions = match discover::select(root, self.options.definition.as_deref()) {
      Ok(definitions) => definitions,
      Err(e) => {
        let e = ReproduceError::from(e);
        error!(error = %e, "cannot select definitions");
        report.record_run_error(&e);
        return report;
      }
    };
    info!(count = definitions.len(), root = %root.display(), "processing definitions");

    let inherited = ExecContext::inherit(root);
    let mut shared = inherited.clone();

    for path in definitions {
      let mut ctx = if self.options.shared_environment {
        shared.clone()
      } else {
        inherited.clone()
      };

      match self.process(&path, &mut ctx) {
        Ok(artifacts) => {
          info!(definition = %path.display(), artifacts = artifacts.len(), "definition succeeded");
          report.record_success(path, artifacts);
        }
        Err(e) => {
          error!(definition = %path.display(), kind = ?e.kind(), error = %e, "definition failed");
          report.record_failure(path, &e);
        }
      }

      if self.options.shared_environment {
        shared = ctx;
      }
    }

    report
  }

  /// Run every stage for one definition, updating `ctx` as stages extend it.
  fn process(&self, path: &Path, ctx: &mut ExecContext) -> Result<Vec<PathBuf>, ReproduceError> {
    debug!(definition = %path.display(), "loading definition");
    let definition = Definition::load(path)?;
    let definition_dir = definition.dir();

    *ctx = toolchain::prepare(definition.toolchain.as_deref(), &self.toolchains, ctx)?;

    let source = definition.source()?;
    let repositories_dir = self.layout.repositories_dir();
    let repo_dir = Synchronizer::new(&self.git, &repositories_dir).synchronize(
      &source,
      &definition.patches,
      path,
      definition_dir,
    )?;

    *ctx = environment::prepare(&definition.env_settings, path, ctx)?;

    let output_dir = self.layout.artifact_dir_for(definition_dir);
    ensure_dir(&output_dir)?;

    build::run_prebuild(&definition.prebuild_commands, &repo_dir, ctx).map_err(ReproduceError::Prebuild)?;

    let mut collected = Vec::new();
    for sample in &definition.samples {
      let artifacts = build::build_sample(sample, &repo_dir, &output_dir, path, ctx)?;
      collected.extend(artifacts);
    }
    Ok(collected)
  }
}
