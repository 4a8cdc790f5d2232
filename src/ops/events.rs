//! Migration event types for JSON output.
//!
//! The migration pipeline reports progress through these events. The CLI
//! renders them as status lines, or prints them one JSON object per line when
//! using `--message-format=json`.
//!
//! # Event Types
//!
//! - `migration-started`: files located and loaded
//! - `package-resolved`: a registry lookup returned
//! - `dependency-changed`: a devDependency was added or updated
//! - `dependency-removed`: a removal was processed (possibly a no-op)
//! - `test-target-rewritten`: a project's test target now uses the new builder
//! - `document-written`: a document was persisted
//! - `migration-finished`: all phases completed
//!
//! # Stability
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::{DependencyChange, DependencyKind};

/// An event emitted while a migration runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum MigrationEvent {
    /// Both documents were loaded and validated.
    #[serde(rename = "migration-started")]
    Started {
        manifest_path: PathBuf,
        workspace_path: PathBuf,
        /// Number of registry lookups about to be issued
        lookups: usize,
        dry_run: bool,
    },

    /// A registry lookup returned the latest version of a package.
    #[serde(rename = "package-resolved")]
    PackageResolved { name: String, version: String },

    /// A devDependency was written into the in-memory manifest.
    #[serde(rename = "dependency-changed")]
    DependencyChanged { change: DependencyChange },

    /// A dependency was removed from the listed tables.
    ///
    /// `removed_from` is empty when the package was not declared.
    #[serde(rename = "dependency-removed")]
    DependencyRemoved {
        name: String,
        removed_from: Vec<DependencyKind>,
    },

    /// A project's test target was replaced.
    #[serde(rename = "test-target-rewritten")]
    TestTargetRewritten { project: String, builder: String },

    /// A document was written back to disk.
    #[serde(rename = "document-written")]
    DocumentWritten { path: PathBuf },

    /// All phases completed.
    #[serde(rename = "migration-finished")]
    Finished {
        /// Whether the documents were written (false for dry runs)
        persisted: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
}
