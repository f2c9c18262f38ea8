//! The outcome of detecting one file.

use std::sync::Arc;

use super::evidence::{ConfidenceLevel, Evidence, EvidenceSource};
use crate::scope::ConfigScope;

/// Name reported when no framework could be attributed.
pub const UNKNOWN_FRAMEWORK: &str = "unknown";

/// Which framework a file belongs to, how sure we are, and why.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub framework: String,
    /// Capped sum of the winner's positive evidence weights (0..=100).
    pub confidence: u8,
    /// Source of the winner's heaviest positive evidence.
    pub source: Option<EvidenceSource>,
    /// The config scope that claimed the file, when it belongs to the winner.
    pub scope: Option<Arc<ConfigScope>>,
    /// Evidence gathered for every candidate framework, winner first.
    pub evidence: Vec<Evidence>,
}

impl DetectionResult {
    pub fn unknown() -> Self {
        Self {
            framework: UNKNOWN_FRAMEWORK.to_string(),
            confidence: 0,
            source: None,
            scope: None,
            evidence: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.framework == UNKNOWN_FRAMEWORK
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Evidence recorded for one framework.
    pub fn evidence_for<'a>(&'a self, framework: &'a str) -> impl Iterator<Item = &'a Evidence> + 'a {
        self.evidence.iter().filter(move |e| e.framework == framework)
    }

    /// Human-readable explanation, one line per evidence entry.
    pub fn explain(&self) -> String {
        let mut out = format!("{} ({}, {})", self.framework, self.confidence, self.level());
        for evidence in &self.evidence {
            out.push_str("\n  ");
            out.push_str(&evidence.to_string());
        }
        out
    }
}
