//! # testlens-analysis
//!
//! Detection engine for the testlens test inventory tool.
//! Contains the scanner, tree-sitter parser resources, the framework
//! registry, the config scope resolver, and the detector.

#![allow(clippy::module_inception)]

pub mod detection;
pub mod frameworks;
pub mod parsers;
pub mod scanner;
pub mod scope;

pub use detection::{ConfidenceLevel, DetectionResult, Detector};
pub use frameworks::FrameworkRegistry;
pub use scanner::{ScanCancellation, ScanInterrupted, ScanResult, Scanner};
pub use scope::{AggregatedProjectScope, ConfigScope, ScopeResolver};
