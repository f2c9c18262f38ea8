//! Signal/match types consumed by matchers and the test inventory produced by
//! structural parsers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::language_detect::Language;

/// What kind of observation a [`Signal`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Import,
    Content,
    Filename,
    ConfigFile,
}

/// One observable fact about a file, fed to matchers.
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    pub kind: SignalKind,
    pub value: &'a str,
    /// Raw bytes backing the signal (the whole file for `Content`).
    pub context: Option<&'a [u8]>,
}

impl<'a> Signal<'a> {
    pub fn import(module: &'a str) -> Self {
        Self {
            kind: SignalKind::Import,
            value: module,
            context: None,
        }
    }

    pub fn content(text: &'a str, raw: &'a [u8]) -> Self {
        Self {
            kind: SignalKind::Content,
            value: text,
            context: Some(raw),
        }
    }

    pub fn filename(name: &'a str) -> Self {
        Self {
            kind: SignalKind::Filename,
            value: name,
            context: None,
        }
    }

    pub fn config_file(name: &'a str) -> Self {
        Self {
            kind: SignalKind::ConfigFile,
            value: name,
            context: None,
        }
    }
}

/// A matcher's verdict on one signal.
///
/// `confidence == 0` means "no opinion". `negative` means the signal rules the
/// framework out, independent of confidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub confidence: u8,
    pub evidence: Vec<String>,
    pub negative: bool,
}

impl MatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positive(confidence: u8, evidence: Vec<String>) -> Self {
        Self {
            confidence: confidence.min(100),
            evidence,
            negative: false,
        }
    }

    pub fn negative(evidence: Vec<String>) -> Self {
        Self {
            confidence: 0,
            evidence,
            negative: true,
        }
    }

    /// A non-negative match with some confidence.
    pub fn is_match(&self) -> bool {
        !self.negative && self.confidence > 0
    }

    pub fn has_opinion(&self) -> bool {
        self.negative || self.confidence > 0
    }

    /// Fold another matcher's verdict on the same signal into this one.
    pub fn merge(&mut self, other: MatchResult) {
        if other.negative && !self.negative {
            // A veto replaces any positive evidence gathered so far.
            self.negative = true;
            self.confidence = 0;
            self.evidence.clear();
        }
        if other.negative == self.negative {
            self.confidence = self.confidence.max(other.confidence);
            self.evidence.extend(other.evidence);
        }
    }
}

/// How a test case will behave when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Active,
    Skipped,
    Focused,
    Todo,
}

/// A single test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub name: String,
    /// 1-based line of the test declaration.
    pub line: u32,
    pub status: TestStatus,
}

/// A group of tests (describe block, test class, Go test with subtests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    pub name: String,
    pub line: u32,
    pub status: TestStatus,
    pub suites: Vec<TestSuite>,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(TestSuite::test_count).sum::<usize>()
    }
}

/// The structural inventory of one test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestFile {
    pub path: PathBuf,
    pub framework: String,
    pub language: Language,
    /// Detection confidence that routed this file to its parser.
    pub confidence: u8,
    pub suites: Vec<TestSuite>,
    pub tests: Vec<TestCase>,
}

impl TestFile {
    pub fn new(path: impl Into<PathBuf>, framework: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            framework: framework.into(),
            language,
            confidence: 0,
            suites: Vec::new(),
            tests: Vec::new(),
        }
    }

    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(TestSuite::test_count).sum::<usize>()
    }
}

/// Every parsed test file of a scan, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub files: Vec<TestFile>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn test_count(&self) -> usize {
        self.files.iter().map(TestFile::test_count).sum()
    }

    /// File count per framework.
    pub fn frameworks(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.framework.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
