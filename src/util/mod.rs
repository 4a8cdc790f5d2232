//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod shell;

pub use config::Config;
pub use context::{GlobalContext, LocateError, ProjectFiles};
pub use diagnostic::Diagnostic;
pub use shell::{ColorChoice, Shell, Status};
