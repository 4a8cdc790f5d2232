//! Implementation of `ngjest migrate`.
//!
//! The migration runs four phases, each finishing before the next starts:
//!
//! 1. Resolve the latest version of every Jest package and add it to
//!    `devDependencies` as a caret range.
//! 2. Remove every Karma package from all dependency tables.
//! 3. Point every project's `test` target at the Jest builder.
//! 4. Write `package.json`, then the workspace file.
//!
//! Nothing is written unless phases 1-3 all succeed.

use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use crate::core::{DependencyChange, DependencyEntry, DependencyKind, Manifest, Workspace};
use crate::ops::events::MigrationEvent;
use crate::sources::Source;
use crate::util::ProjectFiles;

/// Packages added to `devDependencies`, in order.
pub const JEST_PACKAGES: [&str; 4] = ["jest", "jest-preset-angular", "angular-jest-build", "@types/jest"];

/// Packages removed from every dependency table, in order.
pub const KARMA_PACKAGES: [&str; 5] = [
    "karma",
    "karma-chrome-launcher",
    "karma-coverage-istanbul-reporter",
    "karma-jasmine",
    "karma-jasmine-html-reporter",
];

/// Builder the rewritten test targets point at.
pub const JEST_BUILDER: &str = "angular-jest-build:test";

/// What a migration adds, removes and rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Packages to resolve and add as devDependencies
    pub additions: Vec<String>,

    /// Packages to remove from all dependency tables
    pub removals: Vec<String>,

    /// Builder for rewritten test targets
    pub builder: String,
}

impl MigrationPlan {
    /// Create a plan from explicit lists.
    pub fn new<A, R>(additions: A, removals: R, builder: impl Into<String>) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        MigrationPlan {
            additions: additions.into_iter().map(Into::into).collect(),
            removals: removals.into_iter().map(Into::into).collect(),
            builder: builder.into(),
        }
    }
}

impl Default for MigrationPlan {
    /// The Karma to Jest migration.
    fn default() -> Self {
        MigrationPlan::new(JEST_PACKAGES, KARMA_PACKAGES, JEST_BUILDER)
    }
}

/// Options for a migration run.
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// What to change
    pub plan: MigrationPlan,

    /// Run every phase but do not write any file
    pub dry_run: bool,
}

/// A processed removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub name: String,
    /// Tables the package was removed from; empty when it was not declared
    pub removed_from: Vec<DependencyKind>,
}

/// The outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub manifest_path: PathBuf,
    pub workspace_path: PathBuf,
    /// devDependency changes, in addition-list order
    pub changes: Vec<DependencyChange>,
    /// Removals, in removal-list order
    pub removals: Vec<Removal>,
    /// Projects whose test target was rewritten, in document order
    pub rewritten_projects: Vec<String>,
    pub builder: String,
    pub dry_run: bool,
    /// Whether the documents were written
    pub persisted: bool,
}

impl MigrationReport {
    /// Removals that actually deleted something.
    pub fn removed(&self) -> impl Iterator<Item = &Removal> {
        self.removals.iter().filter(|r| !r.removed_from.is_empty())
    }
}

/// Run the migration over a located workspace.
///
/// `on_event` is called on the current thread as each step completes.
pub fn migrate(
    files: &ProjectFiles,
    source: &dyn Source,
    opts: &MigrateOptions,
    on_event: &mut dyn FnMut(&MigrationEvent),
) -> Result<MigrationReport> {
    let start = Instant::now();
    let plan = &opts.plan;

    // Load both documents up front so malformed files fail before any lookup.
    let mut manifest = Manifest::load(&files.manifest_path)?;
    let mut workspace = Workspace::load(&files.workspace_path)?;

    on_event(&MigrationEvent::Started {
        manifest_path: files.manifest_path.clone(),
        workspace_path: files.workspace_path.clone(),
        lookups: plan.additions.len(),
        dry_run: opts.dry_run,
    });

    tracing::info!(
        "Resolving {} packages from {}",
        plan.additions.len(),
        source.name()
    );
    let changes = add_latest_dependencies(&mut manifest, source, &plan.additions, on_event)
        .with_context(|| format!("failed to update {}", files.manifest_path.display()))?;

    tracing::info!("Removing {} packages", plan.removals.len());
    let removals = remove_dependencies(&mut manifest, &plan.removals, on_event)
        .with_context(|| format!("failed to update {}", files.manifest_path.display()))?;

    tracing::info!("Rewriting test targets to {}", plan.builder);
    let rewritten_projects = rewrite_test_targets(&mut workspace, &plan.builder, on_event)
        .with_context(|| format!("failed to update {}", files.workspace_path.display()))?;

    let persisted = if opts.dry_run {
        tracing::info!("Dry run, not writing any file");
        false
    } else {
        manifest.save(&files.manifest_path)?;
        on_event(&MigrationEvent::DocumentWritten {
            path: files.manifest_path.clone(),
        });

        workspace.save(&files.workspace_path)?;
        on_event(&MigrationEvent::DocumentWritten {
            path: files.workspace_path.clone(),
        });
        true
    };

    on_event(&MigrationEvent::Finished {
        persisted,
        duration_ms: start.elapsed().as_millis() as u64,
    });

    Ok(MigrationReport {
        manifest_path: files.manifest_path.clone(),
        workspace_path: files.workspace_path.clone(),
        changes,
        removals,
        rewritten_projects,
        builder: plan.builder.clone(),
        dry_run: opts.dry_run,
        persisted,
    })
}

/// Addition phase: add `^<latest>` for each name as a devDependency.
///
/// Every lookup is started before the first one is awaited. Results are
/// awaited in list order and applied as they are taken, so the manifest is
/// edited in list order whatever order the lookups finish in. The first
/// failed lookup (in list order) aborts the phase.
pub fn add_latest_dependencies(
    manifest: &mut Manifest,
    source: &dyn Source,
    names: &[String],
    on_event: &mut dyn FnMut(&MigrationEvent),
) -> Result<Vec<DependencyChange>> {
    thread::scope(|scope| {
        let lookups: Vec<_> = names
            .iter()
            .map(|name| scope.spawn(move || source.latest_version(name)))
            .collect();

        let mut changes = Vec::with_capacity(lookups.len());
        for (name, lookup) in names.iter().zip(lookups) {
            let version = lookup
                .join()
                .map_err(|_| anyhow!("registry lookup for `{}` panicked", name))??;

            on_event(&MigrationEvent::PackageResolved {
                name: version.name.clone(),
                version: version.version.clone(),
            });

            tracing::debug!("Adding {}", version.name);
            let entry = DependencyEntry::dev(version.name.as_str(), version.caret_range());
            let change = manifest.add_dependency(&entry)?;

            on_event(&MigrationEvent::DependencyChanged {
                change: change.clone(),
            });
            changes.push(change);
        }

        Ok(changes)
    })
}

/// Removal phase: remove each name from every dependency table.
pub fn remove_dependencies(
    manifest: &mut Manifest,
    names: &[String],
    on_event: &mut dyn FnMut(&MigrationEvent),
) -> Result<Vec<Removal>> {
    let mut removals = Vec::with_capacity(names.len());

    for name in names {
        tracing::debug!("Removing {}", name);
        let removed_from = manifest.remove_dependency(name)?;

        on_event(&MigrationEvent::DependencyRemoved {
            name: name.clone(),
            removed_from: removed_from.clone(),
        });
        removals.push(Removal {
            name: name.clone(),
            removed_from,
        });
    }

    Ok(removals)
}

/// Workspace phase: point every existing test target at `builder`.
pub fn rewrite_test_targets(
    workspace: &mut Workspace,
    builder: &str,
    on_event: &mut dyn FnMut(&MigrationEvent),
) -> Result<Vec<String>> {
    let rewritten = workspace.rewrite_test_configs(builder)?;

    for project in &rewritten {
        on_event(&MigrationEvent::TestTargetRewritten {
            project: project.clone(),
            builder: builder.to_string(),
        });
    }

    Ok(rewritten)
}
