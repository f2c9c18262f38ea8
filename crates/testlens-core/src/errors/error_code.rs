//! Stable, machine-readable error codes.

/// Implemented by every error enum so callers can branch on a stable code
/// instead of a display string.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const IO_ERROR: &str = "IO_ERROR";
pub const FILE_TOO_LARGE: &str = "FILE_TOO_LARGE";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const NO_PARSER: &str = "NO_PARSER";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const GRAMMAR_UNAVAILABLE: &str = "GRAMMAR_UNAVAILABLE";
pub const PARSE_FAILED: &str = "PARSE_FAILED";
pub const INVALID_QUERY: &str = "INVALID_QUERY";
pub const CONFIG_SYNTAX: &str = "CONFIG_SYNTAX";
pub const CONFIG_UNSUPPORTED: &str = "CONFIG_UNSUPPORTED";
pub const CONFIG_NOT_APPLICABLE: &str = "CONFIG_NOT_APPLICABLE";
pub const DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
pub const CANCELLED: &str = "CANCELLED";
