//! Scanner input and output types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use testlens_core::errors::{Interruption, ScanError};

use super::language_detect::Language;
use crate::detection::ConfidenceLevel;
use crate::frameworks::Inventory;

/// A file found during the directory walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_size: u64,
    pub language: Option<Language>,
}

/// Number of scanned files per confidence level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceHistogram {
    pub none: usize,
    pub weak: usize,
    pub moderate: usize,
    pub definite: usize,
}

impl ConfidenceHistogram {
    pub fn record(&mut self, level: ConfidenceLevel) {
        match level {
            ConfidenceLevel::None => self.none += 1,
            ConfidenceLevel::Weak => self.weak += 1,
            ConfidenceLevel::Moderate => self.moderate += 1,
            ConfidenceLevel::Definite => self.definite += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.none + self.weak + self.moderate + self.definite
    }
}

/// Statistics from a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Files seen by the directory walk (0 for `scan_files`).
    pub files_discovered: usize,
    /// Candidates whose processing started.
    pub files_scanned: usize,
    /// Scanned files attributed to a framework.
    pub files_matched: usize,
    /// Scanned files that produced a per-file error.
    pub files_failed: usize,
    /// Candidates left out for size or an unsupported language.
    pub files_skipped: usize,
    pub config_scopes: usize,
    pub confidence_histogram: ConfidenceHistogram,
    /// Parsed file count per framework.
    pub frameworks: BTreeMap<String, usize>,
    pub duration: Duration,
}

/// Everything a scan produced. Inventory and errors are sorted by path.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub inventory: Inventory,
    pub errors: Vec<ScanError>,
    pub stats: ScanStats,
}

/// A scan stopped by its deadline or by explicit cancellation, carrying
/// whatever was aggregated before it stopped.
#[derive(Debug, thiserror::Error)]
#[error("{reason}; partial result holds {} parsed files", .result.inventory.files.len())]
pub struct ScanInterrupted {
    pub result: ScanResult,
    pub reason: Interruption,
}

impl ScanInterrupted {
    pub fn is_timeout(&self) -> bool {
        self.reason == Interruption::DeadlineExceeded
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason == Interruption::Cancelled
    }
}
