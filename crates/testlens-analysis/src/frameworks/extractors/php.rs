//! PHPUnit extraction: `test*` methods, `@test` docblocks and `#[Test]`.

use std::path::Path;

use testlens_core::errors::ParseError;

use super::{capture, extract, nest, prune_empty, Item, ItemKind};
use crate::frameworks::traits::{ParseContext, StructuralParser};
use crate::frameworks::types::{TestFile, TestStatus};

const DECLARATIONS: &str = r#"
(class_declaration name: (name) @name) @class
(method_declaration name: (name) @name) @method
"#;

#[derive(Debug, Default, Clone, Copy)]
pub struct PhpUnitExtractor;

impl StructuralParser for PhpUnitExtractor {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError> {
        let (mut file, items) = extract(cx, source, path, DECLARATIONS, |captures, source, items| {
            let Some(name) = capture(captures, "name") else {
                return;
            };
            let name = name.text(source);
            if let Some(method) = capture(captures, "method") {
                if is_test_method(name, method.node, source) {
                    items.push(Item::new(ItemKind::Test, name, method.node, method_status(method.node, source)));
                }
            } else if let Some(class) = capture(captures, "class") {
                items.push(Item::new(ItemKind::Suite, name, class.node, TestStatus::Active));
            }
        })?;
        (file.suites, file.tests) = nest(items);
        prune_empty(&mut file.suites);
        Ok(file)
    }
}

fn is_test_method(name: &str, method: tree_sitter::Node<'_>, source: &[u8]) -> bool {
    if name.starts_with("test") {
        return true;
    }
    let mut cursor = method.walk();
    let has_attribute = method
        .children(&mut cursor)
        .filter(|c| c.kind() == "attribute_list")
        .any(|a| a.utf8_text(source).unwrap_or_default().contains("Test"));
    has_attribute
        || method
            .prev_named_sibling()
            .filter(|s| s.kind() == "comment")
            .is_some_and(|c| c.utf8_text(source).unwrap_or_default().contains("@test"))
}

fn method_status(method: tree_sitter::Node<'_>, source: &[u8]) -> TestStatus {
    let body = method
        .child_by_field_name("body")
        .and_then(|b| b.utf8_text(source).ok())
        .unwrap_or_default();
    if body.contains("markTestSkipped") {
        TestStatus::Skipped
    } else if body.contains("markTestIncomplete") {
        TestStatus::Todo
    } else {
        TestStatus::Active
    }
}
