//! Scanner: discovery, config scoping, detection and structural parsing.
//!
//! - `walker.rs` — parallel directory walk (ignore crate) with default excludes
//! - `conventions.rs` — per-language test file naming conventions
//! - `language_detect.rs` — extension → `Language`
//! - `cancellation.rs` — shared cancel flag plus deadline
//! - `types.rs` — `ScanResult`, `ScanStats`, `ScanInterrupted`
//! - `scanner.rs` — the `Scanner` orchestrator

pub mod cancellation;
pub mod conventions;
pub mod language_detect;
pub mod scanner;
pub mod types;
pub mod walker;

pub use cancellation::ScanCancellation;
pub use language_detect::Language;
pub use scanner::Scanner;
pub use types::{ConfidenceHistogram, DiscoveredFile, ScanInterrupted, ScanResult, ScanStats};
