//! Source trait - common interface for package metadata sources.

use crate::core::PackageVersion;
use crate::sources::registry::LookupError;

/// A source of published package versions.
///
/// Lookups may block on network I/O. Implementations are shared across the
/// threads that run concurrent lookups, hence `Send + Sync`.
pub trait Source: Send + Sync {
    /// Get the source name for display.
    fn name(&self) -> &str;

    /// Look up the version the `latest` dist-tag points to.
    fn latest_version(&self, name: &str) -> Result<PackageVersion, LookupError>;
}
