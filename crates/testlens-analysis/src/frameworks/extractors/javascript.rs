//! describe/it/test extraction for JavaScript and TypeScript.
//!
//! Covers jest, vitest, mocha and playwright (`test.describe`). Modifiers
//! `.skip`, `.only`, `.todo` and the `x`/`f` prefixes map to [`TestStatus`].

use std::path::Path;

use testlens_core::errors::ParseError;

use super::{capture, extract, nest, unquote, Item, ItemKind};
use crate::frameworks::traits::{ParseContext, StructuralParser};
use crate::frameworks::types::{TestFile, TestStatus};

const CALLS: &str = r#"
(call_expression
  function: (_) @callee
  arguments: (arguments . (_) @name)) @call
"#;

const SUITE_FNS: &[&str] = &["describe", "context", "suite", "fdescribe", "xdescribe", "xcontext"];
const TEST_FNS: &[&str] = &["it", "test", "specify", "fit", "xit", "xtest", "xspecify"];
const MODIFIERS: &[&str] = &[
    "skip", "only", "todo", "fixme", "concurrent", "serial", "parallel", "failing",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct JsTestExtractor;

impl StructuralParser for JsTestExtractor {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError> {
        let (mut file, items) = extract(cx, source, path, CALLS, |captures, source, items| {
            let (Some(callee), Some(name), Some(call)) = (
                capture(captures, "callee"),
                capture(captures, "name"),
                capture(captures, "call"),
            ) else {
                return;
            };
            let callee: String = callee.text(source).chars().filter(|c| !c.is_whitespace()).collect();
            if let Some((kind, status)) = classify(&callee) {
                items.push(Item::new(kind, unquote(name.text(source)), call.node, status));
            }
        })?;
        (file.suites, file.tests) = nest(items);
        Ok(file)
    }
}

/// Classify a callee such as `describe`, `it.skip` or `test.describe.only`.
fn classify(callee: &str) -> Option<(ItemKind, TestStatus)> {
    let mut parts = callee.split('.');
    let head = parts.next()?;
    let mut rest: Vec<&str> = parts.collect();

    let kind = if SUITE_FNS.contains(&head) {
        ItemKind::Suite
    } else if head == "test" && rest.first() == Some(&"describe") {
        rest.remove(0);
        ItemKind::Suite
    } else if TEST_FNS.contains(&head) {
        ItemKind::Test
    } else {
        return None;
    };
    if rest.iter().any(|m| !MODIFIERS.contains(m)) {
        return None;
    }

    let status = if head.starts_with('x') || rest.iter().any(|m| matches!(*m, "skip" | "fixme")) {
        TestStatus::Skipped
    } else if head.starts_with('f') || rest.contains(&"only") {
        TestStatus::Focused
    } else if rest.contains(&"todo") {
        TestStatus::Todo
    } else {
        TestStatus::Active
    };
    Some((kind, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_callees() {
        assert_eq!(classify("describe"), Some((ItemKind::Suite, TestStatus::Active)));
        assert_eq!(classify("it.skip"), Some((ItemKind::Test, TestStatus::Skipped)));
        assert_eq!(classify("xit"), Some((ItemKind::Test, TestStatus::Skipped)));
        assert_eq!(classify("fdescribe"), Some((ItemKind::Suite, TestStatus::Focused)));
        assert_eq!(classify("test.todo"), Some((ItemKind::Test, TestStatus::Todo)));
        assert_eq!(
            classify("test.describe.only"),
            Some((ItemKind::Suite, TestStatus::Focused))
        );
        assert_eq!(classify("test.step"), None);
        assert_eq!(classify("expect"), None);
        assert_eq!(classify("describe.each([1])"), None);
    }
}
