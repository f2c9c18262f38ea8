//! Evidence records and confidence levels.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use testlens_core::constants::{
    DEFINITE_THRESHOLD, MODERATE_THRESHOLD, WEIGHT_CONFIG_SCOPE, WEIGHT_CONTENT, WEIGHT_FILENAME,
    WEIGHT_GLOBALS_MODE, WEIGHT_IMPORT,
};

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceSource {
    ConfigScope,
    GlobalsMode,
    Import,
    Content,
    Filename,
}

impl EvidenceSource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigScope => "config-scope",
            Self::GlobalsMode => "globals-mode",
            Self::Import => "import",
            Self::Content => "content",
            Self::Filename => "filename",
        }
    }

    /// Default weight of a positive observation from this source.
    pub fn weight(&self) -> u32 {
        match self {
            Self::ConfigScope => WEIGHT_CONFIG_SCOPE,
            Self::GlobalsMode => WEIGHT_GLOBALS_MODE,
            Self::Import => WEIGHT_IMPORT,
            Self::Content => WEIGHT_CONTENT,
            Self::Filename => WEIGHT_FILENAME,
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What exactly was observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EvidenceKind {
    ScopeMatch { config_path: PathBuf },
    GlobalsEnabled { config_path: PathBuf },
    ImportMatched { module: String },
    ImportConflict { module: String },
    ContentPattern { patterns: Vec<String> },
    ContentConflict { patterns: Vec<String> },
    FilenameConvention { patterns: Vec<String> },
    FilenameConflict { patterns: Vec<String> },
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScopeMatch { config_path } => write!(f, "inside scope of {}", config_path.display()),
            Self::GlobalsEnabled { config_path } => {
                write!(f, "globals enabled by {}", config_path.display())
            }
            Self::ImportMatched { module } => write!(f, "imports '{module}'"),
            Self::ImportConflict { module } => write!(f, "imports conflicting '{module}'"),
            Self::ContentPattern { patterns } => write!(f, "content matches {}", patterns.join(", ")),
            Self::ContentConflict { patterns } => {
                write!(f, "content matches conflicting {}", patterns.join(", "))
            }
            Self::FilenameConvention { patterns } => write!(f, "file name matches {}", patterns.join(", ")),
            Self::FilenameConflict { patterns } => {
                write!(f, "file name matches conflicting {}", patterns.join(", "))
            }
        }
    }
}

/// One observation for or against a framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub framework: String,
    pub source: EvidenceSource,
    pub kind: EvidenceKind,
    /// Contribution to confidence. Always 0 for negative evidence.
    pub weight: u32,
    pub negative: bool,
}

impl Evidence {
    pub fn positive(framework: &str, source: EvidenceSource, kind: EvidenceKind) -> Self {
        Self::weighted(framework, source, kind, source.weight())
    }

    pub fn weighted(framework: &str, source: EvidenceSource, kind: EvidenceKind, weight: u32) -> Self {
        Self {
            framework: framework.to_string(),
            source,
            kind,
            weight,
            negative: false,
        }
    }

    pub fn negative(framework: &str, source: EvidenceSource, kind: EvidenceKind) -> Self {
        Self {
            framework: framework.to_string(),
            source,
            kind,
            weight: 0,
            negative: true,
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "+" };
        write!(f, "[{}] {}{} {} ({})", self.framework, sign, self.weight, self.kind, self.source)
    }
}

/// Qualitative bucket of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    None,
    Weak,
    Moderate,
    Definite,
}

impl ConfidenceLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::None,
            s if s >= DEFINITE_THRESHOLD => Self::Definite,
            s if s >= MODERATE_THRESHOLD => Self::Moderate,
            _ => Self::Weak,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Definite => "definite",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(ConfidenceLevel::from_score(0), ConfidenceLevel::None);
        assert_eq!(ConfidenceLevel::from_score(1), ConfidenceLevel::Weak);
        assert_eq!(ConfidenceLevel::from_score(30), ConfidenceLevel::Weak);
        assert_eq!(ConfidenceLevel::from_score(31), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(70), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(71), ConfidenceLevel::Definite);
        assert_eq!(ConfidenceLevel::from_score(100), ConfidenceLevel::Definite);
    }

    #[test]
    fn display_is_readable() {
        let e = Evidence::positive(
            "vitest",
            EvidenceSource::Import,
            EvidenceKind::ImportMatched { module: "vitest".into() },
        );
        assert_eq!(e.to_string(), "[vitest] +60 imports 'vitest' (import)");
    }
}
