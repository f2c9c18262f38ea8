//! Go `testing` extraction: `func TestXxx(t *testing.T)` and `t.Run` subtests.

use std::path::Path;

use testlens_core::errors::ParseError;

use super::{capture, extract, nest, unquote, Item, ItemKind};
use crate::frameworks::traits::{ParseContext, StructuralParser};
use crate::frameworks::types::{TestFile, TestStatus};

const TESTS: &str = r#"
(function_declaration name: (identifier) @name) @function
(call_expression
  function: (selector_expression field: (field_identifier) @method)
  arguments: (argument_list . [(interpreted_string_literal) (raw_string_literal)] @name)) @call
"#;

#[derive(Debug, Default, Clone, Copy)]
pub struct GoTestExtractor;

impl StructuralParser for GoTestExtractor {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError> {
        let (mut file, items) = extract(cx, source, path, TESTS, |captures, source, items| {
            let Some(name) = capture(captures, "name") else {
                return;
            };
            if let Some(func) = capture(captures, "function") {
                let name = name.text(source);
                if is_test_func(name) {
                    let status = skip_status(func.node, source);
                    items.push(Item::new(ItemKind::Test, name, func.node, status));
                }
            } else if let (Some(method), Some(call)) = (capture(captures, "method"), capture(captures, "call")) {
                if method.text(source) == "Run" {
                    items.push(Item::new(ItemKind::Test, unquote(name.text(source)), call.node, TestStatus::Active));
                }
            }
        })?;
        (file.suites, file.tests) = nest(items);
        Ok(file)
    }
}

/// `TestXxx` where the suffix does not start lowercase; `TestMain` is setup.
fn is_test_func(name: &str) -> bool {
    match name.strip_prefix("Test") {
        Some("Main") => false,
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_lowercase()),
        None => false,
    }
}

fn skip_status(func: tree_sitter::Node<'_>, source: &[u8]) -> TestStatus {
    let body = func
        .child_by_field_name("body")
        .and_then(|b| b.utf8_text(source).ok())
        .unwrap_or_default();
    if body.contains(".Skip(") || body.contains(".SkipNow(") {
        TestStatus::Skipped
    } else {
        TestStatus::Active
    }
}
