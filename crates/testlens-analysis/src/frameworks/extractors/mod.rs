//! Tree-sitter structural parsers, one per language family.
//!
//! Each extractor runs a cached query, turns matches into flat [`Item`]s
//! carrying byte ranges, then [`nest`] rebuilds the suite hierarchy from
//! range containment.

pub mod go;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;

use std::path::Path;

use testlens_core::errors::ParseError;

pub use go::GoTestExtractor;
pub use java::JUnitExtractor;
pub use javascript::JsTestExtractor;
pub use php::PhpUnitExtractor;
pub use python::PytestExtractor;

use super::traits::ParseContext;
use super::types::{TestCase, TestFile, TestStatus, TestSuite};
use crate::parsers::ParsedTree;
use crate::scanner::language_detect::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Suite,
    Test,
}

/// One suite or test declaration found by a query.
#[derive(Debug, Clone)]
pub(crate) struct Item {
    pub kind: ItemKind,
    pub name: String,
    pub line: u32,
    pub start: usize,
    pub end: usize,
    pub status: TestStatus,
}

impl Item {
    pub fn new(kind: ItemKind, name: impl Into<String>, node: tree_sitter::Node<'_>, status: TestStatus) -> Self {
        Self {
            kind,
            name: name.into(),
            line: node.start_position().row as u32 + 1,
            start: node.start_byte(),
            end: node.end_byte(),
            status,
        }
    }
}

/// Rebuild the hierarchy from byte-range containment. A test that contains
/// other items (a Go test with `t.Run` subtests) becomes a suite.
pub(crate) fn nest(mut items: Vec<Item>) -> (Vec<TestSuite>, Vec<TestCase>) {
    items.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    items.dedup_by(|a, b| a.start == b.start && a.end == b.end);
    let mut idx = 0;
    nest_within(&items, &mut idx, usize::MAX)
}

fn nest_within(items: &[Item], idx: &mut usize, end: usize) -> (Vec<TestSuite>, Vec<TestCase>) {
    let mut suites = Vec::new();
    let mut tests = Vec::new();
    while let Some(item) = items.get(*idx) {
        if item.start >= end {
            break;
        }
        *idx += 1;
        let has_children = items.get(*idx).is_some_and(|next| next.start < item.end);
        if item.kind == ItemKind::Suite || has_children {
            let (child_suites, child_tests) = nest_within(items, idx, item.end);
            suites.push(TestSuite {
                name: item.name.clone(),
                line: item.line,
                status: item.status,
                suites: child_suites,
                tests: child_tests,
            });
        } else {
            tests.push(TestCase {
                name: item.name.clone(),
                line: item.line,
                status: item.status,
            });
        }
    }
    (suites, tests)
}

/// Drop suites (recursively) that ended up holding no tests.
pub(crate) fn prune_empty(suites: &mut Vec<TestSuite>) {
    for suite in suites.iter_mut() {
        prune_empty(&mut suite.suites);
    }
    suites.retain(|s| s.test_count() > 0);
}

/// Parse `source`, run `query`, and hand each match's captures to `collect`.
pub(crate) fn extract<F>(
    cx: &ParseContext<'_>,
    source: &[u8],
    path: &Path,
    query: &str,
    mut collect: F,
) -> Result<(TestFile, Vec<Item>), ParseError>
where
    F: FnMut(&[crate::parsers::Capture<'_>], &[u8], &mut Vec<Item>),
{
    let tree: ParsedTree = cx.parsers.parse_path(path, source, cx.cancellation)?;
    if tree.has_errors() {
        tracing::debug!(path = %path.display(), "syntax errors in test file, extracting what parsed");
    }
    let language: Language = tree.grammar().language();
    let mut items = Vec::new();
    for captures in cx.parsers.run_query(&tree, query, source)? {
        collect(&captures, source, &mut items);
    }
    Ok((TestFile::new(path, cx.framework, language), items))
}

/// Strip one layer of quotes from a string literal's text.
pub(crate) fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = trimmed.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}

pub(crate) fn capture<'c, 't>(
    captures: &'c [crate::parsers::Capture<'t>],
    name: &str,
) -> Option<&'c crate::parsers::Capture<'t>> {
    captures.iter().find(|c| c.name == name)
}
