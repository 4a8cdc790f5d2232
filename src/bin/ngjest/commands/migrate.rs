//! `ngjest migrate` command

use std::time::Duration;

use anyhow::Result;

use crate::cli::MigrateArgs;
use crate::GlobalOptions;
use ngjest::core::{DependencyChange, DependencyKind};
use ngjest::ops::{migrate, MigrateOptions, MigrationEvent, MigrationPlan};
use ngjest::sources::NpmRegistry;
use ngjest::util::shell::LookupProgress;
use ngjest::util::{GlobalContext, Status};

pub fn execute(args: MigrateArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let ctx = GlobalContext::new()?;
    let files = ctx.project_files(args.workspace_dir.as_deref())?;

    let mut config = ctx.load_config(&files.root);
    if let Some(url) = args.registry {
        config.registry.url = Some(url);
    }
    let registry = NpmRegistry::new(config.registry_url()?, &config.user_agent())?;

    let opts = MigrateOptions {
        plan: MigrationPlan::default(),
        dry_run: args.dry_run,
    };

    let mut progress: Option<LookupProgress> = None;
    let mut elapsed = Duration::ZERO;

    let report = migrate(&files, &registry, &opts, &mut |event: &MigrationEvent| {
        shell.json_event(event);

        match event {
            MigrationEvent::Started { lookups, .. } => {
                progress = Some(shell.lookup_progress(*lookups));
            }
            MigrationEvent::PackageResolved { name, version } => {
                if let Some(p) = progress.as_mut() {
                    p.resolved(name, version);
                }
            }
            MigrationEvent::DependencyChanged { change } => {
                let (status, msg) = describe_change(change);
                match &progress {
                    Some(p) => p.println(status, msg),
                    None => shell.status(status, msg),
                }
            }
            MigrationEvent::DependencyRemoved { name, removed_from } => {
                if let Some(p) = progress.take() {
                    p.finish();
                }
                if !removed_from.is_empty() {
                    shell.status(
                        Status::Removed,
                        format!("{} (from {})", name, table_list(removed_from)),
                    );
                }
            }
            MigrationEvent::TestTargetRewritten { project, builder } => {
                shell.status(Status::Migrated, format!("{} test -> {}", project, builder));
            }
            MigrationEvent::DocumentWritten { path } => {
                shell.status(Status::Writing, path.display());
            }
            MigrationEvent::Finished { duration_ms, .. } => {
                if let Some(p) = progress.take() {
                    p.finish();
                }
                elapsed = Duration::from_millis(*duration_ms);
            }
        }
    })?;

    if report.rewritten_projects.is_empty() {
        shell.warn("no project has a `test` target; the workspace file was left as is");
    }

    if report.dry_run {
        shell.finished("Dry run (no files written)", elapsed);
    } else {
        shell.finished(
            format!("Migrated {} to Jest", report.workspace_path.display()),
            elapsed,
        );
        shell.note("Run `npm install` to install the new devDependencies");
    }

    Ok(())
}

fn describe_change(change: &DependencyChange) -> (Status, String) {
    match change {
        DependencyChange::Added { name, version, kind } => {
            (Status::Added, format!("{} {} ({})", name, version, kind.table_name()))
        }
        DependencyChange::Updated {
            name, from, to, ..
        } => (Status::Updated, format!("{} {} -> {}", name, from, to)),
        DependencyChange::Unchanged { name, version, kind } => (
            Status::Skipped,
            format!("{} {} (already in {})", name, version, kind.table_name()),
        ),
    }
}

fn table_list(kinds: &[DependencyKind]) -> String {
    kinds
        .iter()
        .map(|k| k.table_name())
        .collect::<Vec<_>>()
        .join(", ")
}
