//! Language detection from file extensions.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source languages testlens can classify and parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Go,
    Java,
    Php,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Go,
        Language::Java,
        Language::Php,
    ];

    /// Detect language from a file extension (without the dot).
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        match ext?.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "php" => Some(Self::Php),
            _ => None,
        }
    }

    /// Detect language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    /// Parse a language name as used in config files and CLI flags.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Some(Self::TypeScript),
            "javascript" | "js" => Some(Self::JavaScript),
            "python" | "py" => Some(Self::Python),
            "go" | "golang" => Some(Self::Go),
            "java" => Some(Self::Java),
            "php" => Some(Self::Php),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::Php => "php",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::TypeScript => &["ts", "tsx", "mts", "cts"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::Python => &["py"],
            Self::Go => &["go"],
            Self::Java => &["java"],
            Self::Php => &["php"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(Language::from_extension(Some("tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("MJS")), Some(Language::JavaScript));
        assert_eq!(Language::from_extension(Some("rb")), None);
        assert_eq!(Language::from_extension(None), None);
    }

    #[test]
    fn every_extension_round_trips() {
        for lang in Language::ALL {
            for ext in lang.extensions() {
                assert_eq!(Language::from_extension(Some(ext)), Some(lang));
            }
            assert_eq!(Language::from_name(lang.name()), Some(lang));
        }
    }
}
