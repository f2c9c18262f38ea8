//! Weighted, explainable framework detection.
//!
//! - `evidence.rs` — `Evidence`, its source/kind, and `ConfidenceLevel`
//! - `imports.rs` — per-language import specifier extraction
//! - `result.rs` — `DetectionResult`
//! - `detector.rs` — `Detector`: scope, import, content and filename stages

pub mod detector;
pub mod evidence;
pub mod imports;
pub mod result;

pub use detector::Detector;
pub use evidence::{ConfidenceLevel, Evidence, EvidenceKind, EvidenceSource};
pub use result::DetectionResult;
