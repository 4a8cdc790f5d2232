//! Registry lookup errors.

use thiserror::Error;

use crate::core::dependency::InvalidPackageName;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A failed "latest version" lookup.
///
/// A lookup either yields exactly one version or one of these; there are no
/// partial results and no retries.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidName(#[from] InvalidPackageName),

    #[error("cannot build registry URL for `{package}`")]
    Url {
        package: String,
        source: url::ParseError,
    },

    #[error("failed to fetch registry metadata for `{package}` from {url}")]
    Request {
        package: String,
        url: String,
        source: reqwest::Error,
    },

    #[error("registry returned HTTP {status} for `{package}`")]
    Status { package: String, status: u16 },

    #[error("registry metadata for `{package}` could not be parsed")]
    Body {
        package: String,
        source: serde_json::Error,
    },

    #[error("registry metadata for `{package}` has no `dist-tags.latest`")]
    MissingLatest { package: String },

    #[error("latest version `{version}` of `{package}` is not a valid semantic version")]
    InvalidVersion {
        package: String,
        version: String,
        source: semver::Error,
    },
}

impl LookupError {
    /// The package whose lookup failed.
    pub fn package(&self) -> &str {
        match self {
            LookupError::InvalidName(e) => &e.name,
            LookupError::Url { package, .. }
            | LookupError::Request { package, .. }
            | LookupError::Status { package, .. }
            | LookupError::Body { package, .. }
            | LookupError::MissingLatest { package }
            | LookupError::InvalidVersion { package, .. } => package,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(format!(
            "failed to look up the latest version of `{}`",
            self.package()
        ))
        .with_context(self.to_string());

        match self {
            LookupError::Request { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::FETCH_FAILED),
            LookupError::Status { status: 404, .. } => diag
                .with_context("the package does not exist in this registry")
                .with_suggestion(suggestions::BAD_REGISTRY),
            LookupError::Status { .. } => diag.with_suggestion(suggestions::FETCH_FAILED),
            LookupError::Body { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::BAD_REGISTRY),
            LookupError::MissingLatest { .. } | LookupError::InvalidVersion { .. } => {
                diag.with_suggestion(suggestions::BAD_REGISTRY)
            }
            LookupError::InvalidName(_) | LookupError::Url { .. } => diag,
        }
    }
}
