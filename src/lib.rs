//! ngjest - Migrate Angular CLI workspaces from Karma to Jest
//!
//! This crate provides the library behind the `ngjest` binary: editing
//! `package.json` and `angular.json`, looking up package versions in an npm
//! registry, and running the migration.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for ngjest unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a stub registry, a loopback HTTP server and
/// workspace fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{manifest::Manifest, workspace::Workspace};
pub use ops::{migrate, MigrateOptions, MigrationPlan, MigrationReport};
pub use sources::{NpmRegistry, Source};
pub use util::context::GlobalContext;
