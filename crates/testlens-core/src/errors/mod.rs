//! Error types for every testlens subsystem.
//!
//! Scan-fatal conditions are modelled by [`Interruption`]; everything else is
//! per-file recoverable and travels inside a [`ScanError`].

pub mod config_error;
pub mod error_code;
pub mod parse_error;
pub mod scan_error;

pub use config_error::{ConfigError, ConfigLoadError};
pub use parse_error::ParseError;
pub use scan_error::{Interruption, ScanError, ScanErrorKind, ScanPhase};
