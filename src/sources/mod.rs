//! Package metadata sources.
//!
//! Sources answer "what is the latest published version of this package?".
//! The npm registry is the production source; tests substitute stubs.

pub mod registry;
pub mod source;

pub use registry::{LookupError, NpmRegistry};
pub use source::Source;
