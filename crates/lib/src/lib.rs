//! reproduce-lib: Core logic for reproducing firmware builds from pinned sources.
//!
//! This crate provides the pipeline that turns a directory of declarative
//! definitions into collected build artifacts:
//! - `definition`: typed `config.toml` model and loader
//! - `discover`: locating definitions under a run root
//! - `layout`: where repositories and artifacts live below the run root
//! - `context`: the search path, environment and directory handed to commands
//! - `toolchain`: named toolchains injected into the command search path
//! - `repository`: clone/fetch/reset/submodule/patch synchronization
//! - `environment`: environment variable settings
//! - `build`: prebuild and sample commands plus artifact collection
//! - `run`: the coordinator that aggregates failures into a report

pub mod build;
pub mod consts;
pub mod context;
pub mod definition;
pub mod discover;
pub mod environment;
pub mod error;
pub mod layout;
pub mod repository;
pub mod run;
pub mod toolchain;
pub mod util;

pub use context::ExecContext;
pub use definition::Definition;
pub use error::{ErrorKind, ReproduceError};
pub use layout::Layout;
pub use run::{RunOptions, RunReport, Runner};
