//! Dependency declarations in a `package.json` manifest.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Maximum length of a package name accepted by the npm registry.
pub const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Lowercase, URL-safe name with an optional `@scope/` prefix.
static PACKAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[a-z0-9\-~][a-z0-9\-._~]*/)?[a-z0-9\-~][a-z0-9\-._~]*$")
        .expect("package name pattern is valid")
});

/// The dependency table a manifest entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `dependencies`
    Runtime,
    /// `devDependencies`
    Development,
    /// `peerDependencies`
    Peer,
    /// `optionalDependencies`
    Optional,
}

impl DependencyKind {
    /// Every kind, in the order tables are scanned on removal.
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::Runtime,
        DependencyKind::Development,
        DependencyKind::Optional,
        DependencyKind::Peer,
    ];

    /// Name of the manifest field holding this table.
    pub fn table_name(&self) -> &'static str {
        match self {
            DependencyKind::Runtime => "dependencies",
            DependencyKind::Development => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
            DependencyKind::Optional => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A dependency to write into a manifest.
///
/// `version_range` is stored exactly as given; callers format the range
/// (e.g. `^29.0.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub name: String,
    pub version_range: String,
    pub kind: DependencyKind,
}

impl DependencyEntry {
    /// Create a new dependency entry.
    pub fn new(
        name: impl Into<String>,
        version_range: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        DependencyEntry {
            name: name.into(),
            version_range: version_range.into(),
            kind,
        }
    }

    /// A `devDependencies` entry.
    pub fn dev(name: impl Into<String>, version_range: impl Into<String>) -> Self {
        Self::new(name, version_range, DependencyKind::Development)
    }
}

/// The latest published version of a package, as reported by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
}

impl PackageVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageVersion {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Caret range accepting compatible updates of this version.
    pub fn caret_range(&self) -> String {
        format!("^{}", self.version)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A package name rejected by [`validate_package_name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid package name `{name}`: {reason}")]
pub struct InvalidPackageName {
    pub name: String,
    pub reason: &'static str,
}

/// Validate a package name against the registry naming rules.
///
/// Rules:
/// - non-empty, at most 214 characters
/// - optional `@scope/` prefix
/// - lowercase URL-safe characters only (`a-z 0-9 - . _ ~`)
/// - must not start with `.` or `_`
pub fn validate_package_name(name: &str) -> Result<(), InvalidPackageName> {
    let invalid = |reason| InvalidPackageName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(invalid("name cannot be longer than 214 characters"));
    }
    if name.starts_with('.') || name.starts_with('_') {
        return Err(invalid("name cannot start with a period or underscore"));
    }
    if !PACKAGE_NAME_RE.is_match(name) {
        return Err(invalid(
            "only lowercase URL-safe characters and an optional @scope/ prefix are allowed",
        ));
    }

    Ok(())
}

/// Escape a package name for use as a registry URL path segment.
///
/// The scope separator is percent-encoded: `@types/jest` -> `@types%2fjest`.
pub fn escaped_name(name: &str) -> String {
    name.replacen('/', "%2f", 1)
}
