//! Plugin contracts implemented by framework definitions.

use std::path::Path;

use testlens_core::errors::{ConfigError, ParseError};

use super::types::{MatchResult, Signal, TestFile};
use crate::parsers::ParserManager;
use crate::scanner::cancellation::ScanCancellation;
use crate::scope::ConfigScope;

/// Judges one signal. Implementations must be pure and return
/// [`MatchResult::none`] for signal kinds they do not handle.
pub trait Matcher: Send + Sync {
    fn matches(&self, signal: &Signal<'_>) -> MatchResult;
}

/// Turns a framework configuration file into a [`ConfigScope`].
pub trait ConfigParser: Send + Sync {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError>;
}

/// Shared resources lent to a structural parser for one file.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub parsers: &'a ParserManager,
    pub cancellation: &'a ScanCancellation,
    /// Name of the framework the file was detected as.
    pub framework: &'a str,
}

/// Extracts suites and tests from a detected test file.
pub trait StructuralParser: Send + Sync {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError>;
}
