//! Scan-level errors: per-file recoverable failures and scan interruption.

use std::fmt;
use std::path::PathBuf;

use super::config_error::ConfigError;
use super::error_code::{self, ErrorCode};
use super::parse_error::ParseError;

/// Why a scan stopped launching new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Interruption {
    #[error("scan deadline exceeded")]
    DeadlineExceeded,

    #[error("scan cancelled")]
    Cancelled,
}

impl ErrorCode for Interruption {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DeadlineExceeded => error_code::DEADLINE_EXCEEDED,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Pipeline stage in which a per-file error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScanPhase {
    Discovery,
    ConfigParse,
    Detection,
    Parsing,
}

impl ScanPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::ConfigParse => "config-parse",
            Self::Detection => "detection",
            Self::Parsing => "parsing",
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The underlying cause of a per-file failure.
#[derive(Debug, thiserror::Error)]
pub enum ScanErrorKind {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Detection failed: {message}")]
    Detection { message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Framework '{framework}' has no structural parser for {language}")]
    NoParser { framework: String, language: String },
}

impl ErrorCode for ScanErrorKind {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => error_code::IO_ERROR,
            Self::FileTooLarge { .. } => error_code::FILE_TOO_LARGE,
            Self::Detection { .. } => error_code::DETECTION_ERROR,
            Self::Parse(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::NoParser { .. } => error_code::NO_PARSER,
        }
    }
}

/// A non-fatal failure tied to one path and one pipeline phase.
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed for {}: {kind}", .path.display())]
pub struct ScanError {
    pub path: PathBuf,
    pub phase: ScanPhase,
    #[source]
    pub kind: ScanErrorKind,
}

impl ScanError {
    pub fn new(path: impl Into<PathBuf>, phase: ScanPhase, kind: impl Into<ScanErrorKind>) -> Self {
        Self {
            path: path.into(),
            phase,
            kind: kind.into(),
        }
    }
}

impl ErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_display_includes_phase_and_path() {
        let err = ScanError::new(
            "/proj/a.test.ts",
            ScanPhase::Parsing,
            ParseError::Interrupted(Interruption::Cancelled),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("parsing failed for /proj/a.test.ts"), "got: {msg}");
        assert_eq!(err.error_code(), error_code::CANCELLED);
    }

    #[test]
    fn interruption_codes_are_distinct() {
        assert_ne!(
            Interruption::DeadlineExceeded.error_code(),
            Interruption::Cancelled.error_code()
        );
    }
}
