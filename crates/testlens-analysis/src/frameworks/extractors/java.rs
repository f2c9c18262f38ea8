//! JUnit 4/5 extraction: annotated test methods grouped by class.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use testlens_core::errors::ParseError;

use super::{capture, extract, nest, prune_empty, Item, ItemKind};
use crate::frameworks::traits::{ParseContext, StructuralParser};
use crate::frameworks::types::{TestFile, TestStatus};

const DECLARATIONS: &str = r#"
(class_declaration name: (identifier) @name) @class
(method_declaration (modifiers) @modifiers name: (identifier) @name) @method
"#;

static TEST_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:org\.junit\.(?:jupiter\.api\.)?)?(Test|ParameterizedTest|RepeatedTest|TestFactory|TestTemplate)\b")
        .expect("valid regex")
});
static DISABLED_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(Ignore|Disabled)\b").expect("valid regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct JUnitExtractor;

impl StructuralParser for JUnitExtractor {
    fn parse(&self, cx: &ParseContext<'_>, source: &[u8], path: &Path) -> Result<TestFile, ParseError> {
        let (mut file, items) = extract(cx, source, path, DECLARATIONS, |captures, source, items| {
            let Some(name) = capture(captures, "name") else {
                return;
            };
            let name = name.text(source);
            if let (Some(method), Some(modifiers)) = (capture(captures, "method"), capture(captures, "modifiers")) {
                let annotations = modifiers.text(source);
                if TEST_ANNOTATION.is_match(annotations) {
                    items.push(Item::new(ItemKind::Test, name, method.node, disabled(annotations)));
                }
            } else if let Some(class) = capture(captures, "class") {
                let status = class
                    .node
                    .child(0)
                    .filter(|c| c.kind() == "modifiers")
                    .map_or(TestStatus::Active, |m| disabled(m.utf8_text(source).unwrap_or_default()));
                items.push(Item::new(ItemKind::Suite, name, class.node, status));
            }
        })?;
        (file.suites, file.tests) = nest(items);
        prune_empty(&mut file.suites);
        Ok(file)
    }
}

fn disabled(annotations: &str) -> TestStatus {
    if DISABLED_ANNOTATION.is_match(annotations) {
        TestStatus::Skipped
    } else {
        TestStatus::Active
    }
}
