//! Global context for ngjest operations.
//!
//! Provides centralized access to the working directory, configuration paths
//! and the files of the Angular workspace being migrated.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;

use crate::core::manifest::MANIFEST_NAME;
use crate::core::workspace::find_workspace_file;
use crate::util::config::{self, Config};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Project directories for ngjest
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("dev", "ngjest", "ngjest"));

/// The workspace files could not be located.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("could not find `angular.json` in `{}` or any parent directory", dir.display())]
    WorkspaceNotFound { dir: PathBuf },

    #[error("could not find `package.json` in `{}`", dir.display())]
    ManifestNotFound { dir: PathBuf },
}

impl LocateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LocateError::WorkspaceNotFound { .. } => Diagnostic::error(self.to_string())
                .with_context("`.angular.json` is accepted as well")
                .with_suggestion(suggestions::NO_WORKSPACE),
            LocateError::ManifestNotFound { dir } => Diagnostic::error(self.to_string())
                .with_location(dir.clone())
                .with_suggestion(suggestions::NO_MANIFEST),
        }
    }
}

/// The two documents a migration edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    /// Directory holding the workspace file
    pub root: PathBuf,
    /// `package.json`
    pub manifest_path: PathBuf,
    /// `angular.json` or `.angular.json`
    pub workspace_path: PathBuf,
}

impl ProjectFiles {
    /// Locate the workspace and manifest files directly inside `root`.
    pub fn in_dir(root: &Path) -> Result<Self, LocateError> {
        let workspace_path =
            find_workspace_file(root).ok_or_else(|| LocateError::WorkspaceNotFound {
                dir: root.to_path_buf(),
            })?;

        let manifest_path = root.join(MANIFEST_NAME);
        if !manifest_path.is_file() {
            return Err(LocateError::ManifestNotFound {
                dir: root.to_path_buf(),
            });
        }

        Ok(ProjectFiles {
            root: root.to_path_buf(),
            manifest_path,
            workspace_path,
        })
    }
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config.toml
    config_dir: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config_dir = PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf());

        GlobalContext { cwd, config_dir }
    }

    /// Override the global configuration directory.
    pub fn with_config_dir(mut self, config_dir: Option<PathBuf>) -> Self {
        self.config_dir = config_dir;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join("config.toml"))
    }

    /// Find the workspace root: the nearest directory, starting at cwd and
    /// searching upward, that holds a workspace file.
    pub fn find_workspace_root(&self) -> Result<PathBuf, LocateError> {
        let mut current = self.cwd.clone();
        loop {
            if find_workspace_file(&current).is_some() {
                return Ok(current);
            }
            if !current.pop() {
                return Err(LocateError::WorkspaceNotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Locate the files to migrate.
    ///
    /// With `explicit_root` only that directory is considered; otherwise the
    /// workspace root is searched for upward from cwd.
    pub fn project_files(&self, explicit_root: Option<&Path>) -> Result<ProjectFiles, LocateError> {
        let root = match explicit_root {
            Some(root) if root.is_absolute() => root.to_path_buf(),
            Some(root) => self.cwd.join(root),
            None => self.find_workspace_root()?,
        };
        ProjectFiles::in_dir(&root)
    }

    /// Load merged global and project configuration for a workspace root.
    pub fn load_config(&self, workspace_root: &Path) -> Config {
        let global = self.config_path();
        config::load_config(global.as_deref(), &config::project_config_path(workspace_root))
    }
}
