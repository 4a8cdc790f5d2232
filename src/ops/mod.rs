//! High-level operations.
//!
//! This module contains the implementation of ngjest commands.

pub mod events;
pub mod migrate;

pub use events::MigrationEvent;
pub use migrate::{
    add_latest_dependencies, migrate, remove_dependencies, rewrite_test_targets, MigrateOptions,
    MigrationPlan, MigrationReport, Removal, JEST_BUILDER, JEST_PACKAGES, KARMA_PACKAGES,
};
