//! Scanner configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_SCOPE_DEPTH, DEFAULT_TIMEOUT_MS, MAX_WORKERS,
};
use crate::errors::ConfigLoadError;

/// Configuration for a scan.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of worker threads. 0 or unset = auto-detect via num_cpus.
    pub workers: Option<usize>,
    /// Whole-scan deadline in milliseconds. Default: 5 minutes.
    pub timeout_ms: Option<u64>,
    /// Maximum candidate file size in bytes. Default: 1MB (1_048_576).
    pub max_file_size: Option<u64>,
    /// Glob patterns (relative to the scan root); if non-empty, only matching
    /// test candidates are processed.
    #[serde(default)]
    pub include: Vec<String>,
    /// Additional ignore patterns beyond the built-in defaults (gitignore syntax).
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Maximum number of directories an upward config walk may visit. Default: 20.
    pub max_scope_depth: Option<usize>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
}

impl ScanConfig {
    /// Load the `[scan]` table of `<root>/testlens.toml`, or defaults if absent.
    pub fn load(root: &Path) -> Result<Self, ConfigLoadError> {
        Ok(super::TestlensConfig::load(root)?.scan)
    }

    /// Returns the effective worker count, clamped to `1..=1024`.
    pub fn effective_workers(&self) -> usize {
        let requested = match self.workers {
            None | Some(0) => num_cpus::get(),
            Some(n) => n,
        };
        requested.clamp(1, MAX_WORKERS)
    }

    /// Returns the effective scan timeout, defaulting to 5 minutes.
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    /// Returns the effective max file size, defaulting to 1MB.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Returns the effective upward-walk depth, defaulting to 20.
    pub fn effective_max_scope_depth(&self) -> usize {
        self.max_scope_depth.unwrap_or(DEFAULT_MAX_SCOPE_DEPTH).max(1)
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.effective_timeout(), Duration::from_secs(300));
        assert_eq!(config.effective_max_file_size(), 1_048_576);
        assert_eq!(config.effective_max_scope_depth(), 20);
        assert!(config.effective_workers() >= 1);
        assert!(!config.effective_follow_symlinks());
    }

    #[test]
    fn workers_are_capped() {
        let config = ScanConfig {
            workers: Some(1_000_000),
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), MAX_WORKERS);
    }

    #[test]
    fn zero_workers_means_auto() {
        let config = ScanConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), num_cpus::get().clamp(1, MAX_WORKERS));
    }
}
