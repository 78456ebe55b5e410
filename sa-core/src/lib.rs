//! Simple Analytics Core - errors, configuration, and logging.
//!
//! This crate provides the shared foundation used by the API client and the
//! command-line tool:
//! - The error taxonomy returned by every client operation
//! - Configuration file handling with environment overrides
//! - Structured logging with tracing
//! - Platform directories and common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{NetworkErrorKind, SaError, SaResult};
pub use logging::init_logging;
pub use platform::Platform;
