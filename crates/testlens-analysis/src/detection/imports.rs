//! Import specifier extraction.
//!
//! Regex based: the detector needs module names quickly and for every
//! candidate file, long before a full parse is justified.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::language_detect::Language;

static JS_IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?(?:[\w*{}\s,$]+?\s+from\s+)?['"]([^'"\n]+)['"]"#).unwrap()
});
static JS_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap());
static PY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+(?:\s+as\s+\w+)?(?:\s*,\s*[\w.]+(?:\s+as\s+\w+)?)*)").unwrap());
static PY_FROM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b").unwrap());
static GO_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap());
static GO_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\bimport\s*\((.*?)\)").unwrap());
static GO_SPEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static JAVA_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").unwrap());
static PHP_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*use\s+(?:function\s+|const\s+)?\\?([\w\\]+)").unwrap());

/// Module specifiers imported by `source`, in first-seen order without duplicates.
pub fn extract_imports(language: Language, source: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |module: &str| {
        let module = module.trim();
        if !module.is_empty() && !found.iter().any(|m| m == module) {
            found.push(module.to_string());
        }
    };

    match language {
        Language::JavaScript | Language::TypeScript => {
            let mut hits: Vec<(usize, &str)> = JS_IMPORT_FROM
                .captures_iter(source)
                .chain(JS_REQUIRE.captures_iter(source))
                .filter_map(|c| c.get(1))
                .map(|m| (m.start(), m.as_str()))
                .collect();
            hits.sort_by_key(|(pos, _)| *pos);
            for (_, module) in hits {
                push(module);
            }
        }
        Language::Python => {
            let mut hits: Vec<(usize, &str)> = Vec::new();
            for caps in PY_IMPORT.captures_iter(source) {
                if let Some(list) = caps.get(1) {
                    for item in list.as_str().split(',') {
                        if let Some(module) = item.split_whitespace().next() {
                            hits.push((list.start(), module));
                        }
                    }
                }
            }
            for caps in PY_FROM.captures_iter(source) {
                if let Some(m) = caps.get(1) {
                    hits.push((m.start(), m.as_str()));
                }
            }
            hits.sort_by_key(|(pos, _)| *pos);
            for (_, module) in hits {
                push(module);
            }
        }
        Language::Go => {
            let mut hits: Vec<(usize, &str)> = GO_SINGLE
                .captures_iter(source)
                .filter_map(|c| c.get(1))
                .map(|m| (m.start(), m.as_str()))
                .collect();
            for block in GO_BLOCK.captures_iter(source).filter_map(|c| c.get(1)) {
                for spec in GO_SPEC.captures_iter(block.as_str()).filter_map(|c| c.get(1)) {
                    hits.push((block.start() + spec.start(), spec.as_str()));
                }
            }
            hits.sort_by_key(|(pos, _)| *pos);
            for (_, module) in hits {
                push(module);
            }
        }
        Language::Java => {
            for m in JAVA_IMPORT.captures_iter(source).filter_map(|c| c.get(1)) {
                push(m.as_str());
            }
        }
        Language::Php => {
            for m in PHP_USE.captures_iter(source).filter_map(|c| c.get(1)) {
                push(m.as_str());
            }
        }
    }
    found
}
