//! Parser-layer errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};
use super::scan_error::Interruption;

/// Errors raised while building syntax trees or compiling queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Unsupported language for extension: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("Grammar unavailable for {language}")]
    GrammarUnavailable { language: String },

    #[error("Parse interrupted: {0}")]
    Interrupted(#[from] Interruption),

    #[error("tree-sitter failed on {path}: {message}")]
    TreeSitterFailed { path: PathBuf, message: String },

    #[error("Invalid {language} query: {message}")]
    Query { language: String, message: String },
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            Self::GrammarUnavailable { .. } => error_code::GRAMMAR_UNAVAILABLE,
            Self::Interrupted(i) => i.error_code(),
            Self::TreeSitterFailed { .. } => error_code::PARSE_FAILED,
            Self::Query { .. } => error_code::INVALID_QUERY,
        }
    }
}
