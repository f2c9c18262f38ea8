//! pytest extraction: `test_*` functions and `Test*` classes.

use std::path::Path;

use testlens_core::errors::ParseError;

use super::{capture, extract, nest, prune_empty, Item, ItemKind};
use crate::frameworks::traits::{ParseContext, StructuralParser};
use crate::frameworks::types::{TestFile, TestStatus};

const DEFINITIONS: &str = r#"
(function_definition name: (identifier) @name) @function
(class_definition name: (identifier) @name) @class
"#;

#[derive(Debug, Default, Clone, Copy)]
pub struct PytestExtractor;

impl StructuralParser for PytestExtractor {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError> {
        let (mut file, items) = extract(cx, source, path, DEFINITIONS, |captures, source, items| {
            let Some(name) = capture(captures, "name") else {
                return;
            };
            let name = name.text(source);
            if let Some(def) = capture(captures, "function") {
                if name.starts_with("test") {
                    let status = decorator_status(def.node, source);
                    items.push(Item::new(ItemKind::Test, name, def.node, status));
                }
            } else if let Some(class) = capture(captures, "class") {
                if name.starts_with("Test") {
                    let status = decorator_status(class.node, source);
                    items.push(Item::new(ItemKind::Suite, name, class.node, status));
                }
            }
        })?;
        (file.suites, file.tests) = nest(items);
        prune_empty(&mut file.suites);
        Ok(file)
    }
}

/// `@pytest.mark.skip` / `skipif` on the enclosing decorated definition.
fn decorator_status(node: tree_sitter::Node<'_>, source: &[u8]) -> TestStatus {
    let Some(parent) = node.parent().filter(|p| p.kind() == "decorated_definition") else {
        return TestStatus::Active;
    };
    let mut cursor = parent.walk();
    let skipped = parent
        .children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .any(|d| {
            let text = d.utf8_text(source).unwrap_or_default();
            text.contains("mark.skip") || text.contains("unittest.skip")
        });
    if skipped {
        TestStatus::Skipped
    } else {
        TestStatus::Active
    }
}
