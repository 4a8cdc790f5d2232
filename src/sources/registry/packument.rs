//! Registry metadata documents ("packuments").
//!
//! Only the `dist-tags` map is read:
//!
//! ```json
//! {
//!   "name": "jest",
//!   "dist-tags": { "latest": "29.7.0", "next": "30.0.0-alpha.6" },
//!   "versions": { "...": {} }
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::dependency::PackageVersion;
use crate::sources::registry::LookupError;

/// The subset of a packument this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Packument {
    /// Named pointers to published versions.
    ///
    /// Kept untyped: registries publish odd values under tags nobody reads.
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: Map<String, Value>,
}

impl Packument {
    /// Version pointed to by `tag`, if it is a string.
    pub fn dist_tag(&self, tag: &str) -> Option<&str> {
        self.dist_tags.get(tag).and_then(Value::as_str)
    }
}

/// Extract the `latest` version of `package` from a packument body.
pub fn parse_latest(package: &str, body: &str) -> Result<PackageVersion, LookupError> {
    let packument: Packument = serde_json::from_str(body).map_err(|source| LookupError::Body {
        package: package.to_string(),
        source,
    })?;

    let latest = packument
        .dist_tag("latest")
        .ok_or_else(|| LookupError::MissingLatest {
            package: package.to_string(),
        })?;

    semver::Version::parse(latest).map_err(|source| LookupError::InvalidVersion {
        package: package.to_string(),
        version: latest.to_string(),
        source,
    })?;

    Ok(PackageVersion::new(package, latest))
}
