//! `angular.json` workspace document.
//!
//! A workspace lists its projects under `projects`. Each project binds its
//! tasks to builders in an `architect` map (`targets` in newer files):
//!
//! ```json
//! {
//!   "projects": {
//!     "app": {
//!       "architect": {
//!         "test": { "builder": "@angular-devkit/build-angular:karma", "options": {} }
//!       }
//!     }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::document::{to_pretty_string, JsonMap};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs;

/// Canonical workspace file name.
pub const WORKSPACE_NAME: &str = "angular.json";

/// Hidden alias accepted when the canonical file is absent.
pub const WORKSPACE_ALIAS: &str = ".angular.json";

/// Name of the target rewritten by the migration.
pub const TEST_TARGET: &str = "test";

/// A workspace document that does not have the expected shape.
#[derive(Debug, Error)]
pub enum WorkspaceFormatError {
    #[error("failed to parse workspace file")]
    Parse(#[source] serde_json::Error),

    #[error("workspace file must contain a JSON object at the top level")]
    NotAnObject,

    #[error("workspace file has no `projects` map")]
    MissingProjects,

    #[error("`projects` in workspace file must be an object")]
    InvalidProjects,

    #[error("project `{project}` must be an object")]
    InvalidProject { project: String },

    #[error("`{field}` of project `{project}` must be an object")]
    InvalidTargets {
        project: String,
        field: &'static str,
    },

    #[error("`test` target of project `{project}` must be an object")]
    InvalidTestTarget { project: String },
}

impl WorkspaceFormatError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            WorkspaceFormatError::Parse(e) => diag
                .with_context(format!("line {}, column {}: {}", e.line(), e.column(), e))
                .with_suggestion(suggestions::FIX_WORKSPACE),
            WorkspaceFormatError::MissingProjects => diag
                .with_context("Angular CLI 6+ workspaces declare their projects under `projects`")
                .with_suggestion(suggestions::UPDATE_ANGULAR),
            _ => diag.with_suggestion(suggestions::FIX_WORKSPACE),
        }
    }
}

/// The typed view of a project's `test` target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    pub builder: String,
    #[serde(default)]
    pub options: JsonMap,
}

impl TestConfig {
    /// A test target bound to `builder` with no options.
    pub fn for_builder(builder: impl Into<String>) -> Self {
        TestConfig {
            builder: builder.into(),
            options: JsonMap::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = JsonMap::new();
        map.insert("builder".into(), Value::String(self.builder.clone()));
        map.insert("options".into(), Value::Object(self.options.clone()));
        Value::Object(map)
    }
}

/// An in-memory `angular.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    doc: JsonMap,
}

impl Workspace {
    /// Load a workspace from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
            .with_context(|| format!("invalid workspace file: {}", path.display()))
    }

    /// Parse workspace content and validate the project map.
    pub fn parse(content: &str) -> Result<Self, WorkspaceFormatError> {
        let doc = match serde_json::from_str(content).map_err(WorkspaceFormatError::Parse)? {
            Value::Object(doc) => doc,
            _ => return Err(WorkspaceFormatError::NotAnObject),
        };

        let workspace = Workspace { doc };
        // Surface shape errors at load time rather than mid-run.
        workspace.projects_with_tests()?;
        Ok(workspace)
    }

    /// Write the whole document back to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write_string(path, &self.to_json_string()?)
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_string(&self) -> Result<String> {
        to_pretty_string(&self.doc).context("failed to serialize workspace file")
    }

    /// The underlying document.
    pub fn as_map(&self) -> &JsonMap {
        &self.doc
    }

    fn projects(&self) -> Result<&JsonMap, WorkspaceFormatError> {
        self.doc
            .get("projects")
            .ok_or(WorkspaceFormatError::MissingProjects)?
            .as_object()
            .ok_or(WorkspaceFormatError::InvalidProjects)
    }

    fn projects_mut(&mut self) -> Result<&mut JsonMap, WorkspaceFormatError> {
        self.doc
            .get_mut("projects")
            .ok_or(WorkspaceFormatError::MissingProjects)?
            .as_object_mut()
            .ok_or(WorkspaceFormatError::InvalidProjects)
    }

    /// Project names in document order.
    pub fn project_names(&self) -> Result<Vec<&str>, WorkspaceFormatError> {
        Ok(self.projects()?.keys().map(String::as_str).collect())
    }

    /// Names of projects that currently have a `test` target.
    pub fn projects_with_tests(&self) -> Result<Vec<String>, WorkspaceFormatError> {
        let mut selected = Vec::new();
        for (name, project) in self.projects()? {
            if find_test_target(name, project)?.is_some() {
                selected.push(name.clone());
            }
        }
        Ok(selected)
    }

    /// The typed `test` target of `project`, if it has one.
    ///
    /// Returns `None` for unknown projects and for test targets that do not
    /// name a builder.
    pub fn test_config(&self, project: &str) -> Result<Option<TestConfig>, WorkspaceFormatError> {
        let Some(value) = self.projects()?.get(project) else {
            return Ok(None);
        };
        Ok(find_test_target(project, value)?
            .and_then(|test| serde_json::from_value(Value::Object(test.clone())).ok()))
    }

    /// Replace the `test` target of every project that has one with
    /// `{ "builder": <builder>, "options": {} }`.
    ///
    /// Previous options are discarded. Projects without a `test` target are
    /// not touched. Returns the rewritten project names in document order.
    pub fn rewrite_test_configs(
        &mut self,
        builder: &str,
    ) -> Result<Vec<String>, WorkspaceFormatError> {
        let replacement = TestConfig::for_builder(builder).to_value();
        let mut rewritten = Vec::new();

        for (name, project) in self.projects_mut()?.iter_mut() {
            let Some(targets) = targets_mut(name, project)? else {
                continue;
            };
            match targets.get_mut(TEST_TARGET) {
                Some(test) if test.is_object() => {
                    tracing::debug!("Updating {}'s 'test' node", name);
                    *test = replacement.clone();
                    rewritten.push(name.clone());
                }
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(WorkspaceFormatError::InvalidTestTarget {
                        project: name.clone(),
                    })
                }
            }
        }

        Ok(rewritten)
    }
}

/// Field holding a project's targets: `architect`, or the `targets` alias.
///
/// A null field counts as absent.
fn targets_field(project: &JsonMap) -> Option<&'static str> {
    ["architect", "targets"]
        .into_iter()
        .find(|field| project.get(*field).is_some_and(|v| !v.is_null()))
}

fn project_object<'a>(name: &str, project: &'a Value) -> Result<&'a JsonMap, WorkspaceFormatError> {
    project
        .as_object()
        .ok_or_else(|| WorkspaceFormatError::InvalidProject {
            project: name.to_string(),
        })
}

/// The `test` target of a project, validating the path to it.
fn find_test_target<'a>(
    name: &str,
    project: &'a Value,
) -> Result<Option<&'a JsonMap>, WorkspaceFormatError> {
    let project = project_object(name, project)?;
    let Some(field) = targets_field(project) else {
        return Ok(None);
    };
    let targets = match &project[field] {
        Value::Null => return Ok(None),
        Value::Object(targets) => targets,
        _ => {
            return Err(WorkspaceFormatError::InvalidTargets {
                project: name.to_string(),
                field,
            })
        }
    };
    match targets.get(TEST_TARGET) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(test)) => Ok(Some(test)),
        Some(_) => Err(WorkspaceFormatError::InvalidTestTarget {
            project: name.to_string(),
        }),
    }
}

fn targets_mut<'a>(
    name: &str,
    project: &'a mut Value,
) -> Result<Option<&'a mut JsonMap>, WorkspaceFormatError> {
    let project = project
        .as_object_mut()
        .ok_or_else(|| WorkspaceFormatError::InvalidProject {
            project: name.to_string(),
        })?;
    let Some(field) = targets_field(project) else {
        return Ok(None);
    };
    match project.get_mut(field) {
        Some(Value::Object(targets)) => Ok(Some(targets)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(WorkspaceFormatError::InvalidTargets {
            project: name.to_string(),
            field,
        }),
    }
}

/// Find the workspace file in `dir`.
///
/// `angular.json` wins over `.angular.json` when both exist.
pub fn find_workspace_file(dir: &Path) -> Option<PathBuf> {
    [WORKSPACE_NAME, WORKSPACE_ALIAS]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
