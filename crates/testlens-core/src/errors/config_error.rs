//! Framework config and project config errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors from parsing a framework configuration file into a scope.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config syntax in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("No config parser registered for framework '{framework}'")]
    Unsupported { framework: String },

    /// A shared file (`pyproject.toml`, `setup.cfg`) with no section for
    /// this framework. Not a failure: the file simply is not its config.
    #[error("{path} carries no {framework} settings")]
    NotApplicable { path: PathBuf, framework: String },
}

impl ConfigError {
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Syntax { .. } => error_code::CONFIG_SYNTAX,
            Self::Unsupported { .. } => error_code::CONFIG_UNSUPPORTED,
            Self::NotApplicable { .. } => error_code::CONFIG_NOT_APPLICABLE,
        }
    }
}

/// Errors from loading `testlens.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ErrorCode for ConfigLoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => error_code::IO_ERROR,
            Self::TomlParse(_) => error_code::CONFIG_SYNTAX,
        }
    }
}
