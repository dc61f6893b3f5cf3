//! Changelint Core - Core library for changelog linting
//!
//! This crate provides the error taxonomy, configuration loading and
//! project metadata lookup shared by the changelint crates.

pub mod config;
pub mod error;
pub mod project;
pub mod types;

pub use config::{AddRequest, LintConfig};
pub use error::{ChangelintError, Result};
pub use project::ProjectManifest;
pub use types::{clean_version, ReleaseType};
