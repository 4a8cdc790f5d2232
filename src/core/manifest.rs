//! `package.json` manifest editing.
//!
//! The manifest is kept as an ordered JSON object. Edits touch only the
//! dependency tables; every other field, and the order of all fields, survives
//! a load/edit/save round trip.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::dependency::{DependencyEntry, DependencyKind};
use crate::core::document::{insert_ordered, to_pretty_string, JsonMap};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs;

/// Conventional manifest file name in the workspace root.
pub const MANIFEST_NAME: &str = "package.json";

/// A manifest that does not have the expected document shape.
#[derive(Debug, Error)]
pub enum ManifestFormatError {
    #[error("failed to parse package.json")]
    Parse(#[source] serde_json::Error),

    #[error("package.json must contain a JSON object at the top level")]
    NotAnObject,

    #[error("`{table}` in package.json must be an object")]
    InvalidTable { table: &'static str },
}

impl ManifestFormatError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ManifestFormatError::Parse(e) => diag
                .with_context(format!("line {}, column {}: {}", e.line(), e.column(), e))
                .with_suggestion(suggestions::FIX_MANIFEST),
            ManifestFormatError::NotAnObject => diag.with_suggestion(suggestions::FIX_MANIFEST),
            ManifestFormatError::InvalidTable { table } => diag
                .with_context(format!("expected `\"{}\": {{ \"<name>\": \"<range>\" }}`", table))
                .with_suggestion(suggestions::FIX_MANIFEST),
        }
    }
}

/// The effect of [`Manifest::add_dependency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DependencyChange {
    /// The name was not in the table before.
    Added {
        name: String,
        version: String,
        kind: DependencyKind,
    },
    /// The name was already in the table with a different range.
    Updated {
        name: String,
        from: String,
        to: String,
        kind: DependencyKind,
    },
    /// The name was already in the table with the same range.
    Unchanged {
        name: String,
        version: String,
        kind: DependencyKind,
    },
}

impl DependencyChange {
    pub fn name(&self) -> &str {
        match self {
            DependencyChange::Added { name, .. }
            | DependencyChange::Updated { name, .. }
            | DependencyChange::Unchanged { name, .. } => name,
        }
    }
}

/// An in-memory `package.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    doc: JsonMap,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
            .with_context(|| format!("invalid manifest: {}", path.display()))
    }

    /// Parse manifest content.
    pub fn parse(content: &str) -> Result<Self, ManifestFormatError> {
        match serde_json::from_str(content).map_err(ManifestFormatError::Parse)? {
            Value::Object(doc) => Ok(Manifest { doc }),
            _ => Err(ManifestFormatError::NotAnObject),
        }
    }

    /// Write the whole manifest back to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write_string(path, &self.to_json_string()?)
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_string(&self) -> Result<String> {
        to_pretty_string(&self.doc).context("failed to serialize manifest")
    }

    /// The underlying document.
    pub fn as_map(&self) -> &JsonMap {
        &self.doc
    }

    /// Look up the version range of `name` in the table for `kind`.
    pub fn dependency(&self, kind: DependencyKind, name: &str) -> Option<&str> {
        self.doc
            .get(kind.table_name())
            .and_then(Value::as_object)
            .and_then(|table| table.get(name))
            .and_then(Value::as_str)
    }

    /// All tables that currently declare `name`.
    pub fn kinds_of(&self, name: &str) -> Vec<DependencyKind> {
        DependencyKind::ALL
            .into_iter()
            .filter(|kind| {
                self.doc
                    .get(kind.table_name())
                    .and_then(Value::as_object)
                    .is_some_and(|table| table.contains_key(name))
            })
            .collect()
    }

    /// Insert or overwrite a dependency in the table matching its kind.
    ///
    /// The range is stored exactly as given. An entry for the same name in a
    /// different table is left alone.
    pub fn add_dependency(
        &mut self,
        entry: &DependencyEntry,
    ) -> Result<DependencyChange, ManifestFormatError> {
        let table_name = entry.kind.table_name();
        let table = self
            .doc
            .entry(table_name)
            .or_insert_with(|| Value::Object(JsonMap::new()))
            .as_object_mut()
            .ok_or(ManifestFormatError::InvalidTable { table: table_name })?;

        let previous = insert_ordered(
            table,
            &entry.name,
            Value::String(entry.version_range.clone()),
        );

        let change = match previous {
            None => DependencyChange::Added {
                name: entry.name.clone(),
                version: entry.version_range.clone(),
                kind: entry.kind,
            },
            Some(Value::String(from)) if from == entry.version_range => {
                DependencyChange::Unchanged {
                    name: entry.name.clone(),
                    version: from,
                    kind: entry.kind,
                }
            }
            Some(previous) => DependencyChange::Updated {
                name: entry.name.clone(),
                from: match previous {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
                to: entry.version_range.clone(),
                kind: entry.kind,
            },
        };

        Ok(change)
    }

    /// Remove `name` from every dependency table that contains it.
    ///
    /// Returns the tables it was removed from; an empty list means the name
    /// was not declared anywhere. Tables left empty are kept.
    pub fn remove_dependency(
        &mut self,
        name: &str,
    ) -> Result<Vec<DependencyKind>, ManifestFormatError> {
        let mut removed_from = Vec::new();

        for kind in DependencyKind::ALL {
            let table_name = kind.table_name();
            let Some(table) = self.doc.get_mut(table_name) else {
                continue;
            };
            let table = table
                .as_object_mut()
                .ok_or(ManifestFormatError::InvalidTable { table: table_name })?;

            if table.shift_remove(name).is_some() {
                removed_from.push(kind);
            }
        }

        Ok(removed_from)
    }
}
