//! Core data structures for ngjest.
//!
//! This module contains the documents a migration edits and the types that
//! describe dependencies:
//! - Ordered JSON documents
//! - `package.json` manifests and their dependency tables
//! - `angular.json` workspaces and their test targets

pub mod dependency;
pub mod document;
pub mod manifest;
pub mod workspace;

pub use dependency::{DependencyEntry, DependencyKind, PackageVersion};
pub use manifest::{DependencyChange, Manifest, ManifestFormatError, MANIFEST_NAME};
pub use workspace::{
    find_workspace_file, TestConfig, Workspace, WorkspaceFormatError, WORKSPACE_ALIAS,
    WORKSPACE_NAME,
};
