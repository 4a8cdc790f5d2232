//! npm registry source.
//!
//! Looks up the `latest` dist-tag of a package with one GET per call:
//!
//! ```text
//! GET https://registry.npmjs.org/jest
//! GET https://registry.npmjs.org/@types%2fjest
//! ```
//!
//! The abbreviated metadata format is requested; it carries `dist-tags` and
//! is a fraction of the size of the full document. Requests are not retried,
//! cached or timed out.

pub mod error;
pub mod packument;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use url::Url;

use crate::core::dependency::{escaped_name, validate_package_name, PackageVersion};
use crate::sources::Source;

pub use error::LookupError;
pub use packument::{parse_latest, Packument};

/// Accept header npm clients send for metadata requests.
pub const METADATA_ACCEPT: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

/// A source backed by an npm-compatible registry.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    /// Registry base URL, always ending in `/`
    base_url: Url,

    client: Client,
}

impl NpmRegistry {
    /// Create a registry source with its own HTTP client.
    pub fn new(base_url: Url, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Option::<Duration>::None)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a registry source using an existing HTTP client.
    pub fn with_client(mut base_url: Url, client: Client) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        NpmRegistry { base_url, client }
    }

    /// Registry base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Metadata URL for a package.
    pub fn package_url(&self, name: &str) -> Result<Url, LookupError> {
        self.base_url
            .join(&escaped_name(name))
            .map_err(|source| LookupError::Url {
                package: name.to_string(),
                source,
            })
    }
}

impl Source for NpmRegistry {
    fn name(&self) -> &str {
        self.base_url.as_str()
    }

    fn latest_version(&self, name: &str) -> Result<PackageVersion, LookupError> {
        validate_package_name(name)?;
        let url = self.package_url(name)?;

        tracing::debug!("Fetching latest version of {} from {}", name, url);

        let request_error = |source| LookupError::Request {
            package: name.to_string(),
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, METADATA_ACCEPT)
            .send()
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                package: name.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(request_error)?;
        let version = parse_latest(name, &body)?;

        tracing::debug!("Resolved {}", version);
        Ok(version)
    }
}
