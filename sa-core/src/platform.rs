//! Platform-specific directories.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{SaError, SaResult};

/// Filesystem locations for configuration and logs.
pub struct Platform;

impl Platform {
    /// Configuration directory.
    ///
    /// - Windows: `%APPDATA%/simple-analytics`
    /// - macOS: `~/Library/Application Support/simple-analytics`
    /// - Linux: `~/.config/simple-analytics`
    pub fn config_dir() -> SaResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| SaError::Config("could not determine config directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Data directory, used for log files.
    ///
    /// - Windows: `%APPDATA%/simple-analytics`
    /// - macOS: `~/Library/Application Support/simple-analytics`
    /// - Linux: `~/.local/share/simple-analytics`
    pub fn data_dir() -> SaResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| SaError::Config("could not determine data directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Default log directory.
    pub fn log_dir() -> SaResult<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
