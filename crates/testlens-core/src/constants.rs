//! Shared constants: detection weights, confidence thresholds, scan defaults.

/// Weight of evidence from an enclosing framework config file.
pub const WEIGHT_CONFIG_SCOPE: u32 = 80;
/// Bonus weight when the enclosing config declares globals mode.
pub const WEIGHT_GLOBALS_MODE: u32 = 10;
/// Weight of a matching import/require statement.
pub const WEIGHT_IMPORT: u32 = 60;
/// Weight of a framework-specific content pattern.
pub const WEIGHT_CONTENT: u32 = 40;
/// Weight of a filename convention match.
pub const WEIGHT_FILENAME: u32 = 20;

/// Confidence is capped here regardless of how much evidence accumulates.
pub const MAX_CONFIDENCE: u8 = 100;
/// Lowest score classified as `Definite`.
pub const DEFINITE_THRESHOLD: u8 = 71;
/// Lowest score classified as `Moderate`.
pub const MODERATE_THRESHOLD: u8 = 31;

/// Default scan timeout: 5 minutes.
pub const DEFAULT_TIMEOUT_MS: u64 = 5 * 60 * 1000;
/// Default maximum candidate file size: 1MB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;
/// Hard backstop for upward config-scope walks.
pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 20;
/// Hard cap on worker threads.
pub const MAX_WORKERS: usize = 1024;

/// Project config file read by `TestlensConfig::load`.
pub const CONFIG_FILE_NAME: &str = "testlens.toml";
/// Environment variable consulted for the tracing filter.
pub const LOG_ENV_VAR: &str = "TESTLENS_LOG";
