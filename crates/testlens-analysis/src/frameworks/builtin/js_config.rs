//! Lightweight readers for JavaScript/TypeScript/JSON/YAML config files.
//!
//! JS configs are not evaluated. Literal properties are scraped with regexes,
//! which covers the common `export default { ... }` / `defineConfig({ ... })`
//! shapes. When a key appears more than once, the occurrence at the
//! shallowest brace depth wins, so `optimizeDeps: { include }` never shadows
//! a top-level `include`. JSON and YAML are parsed properly and report syntax
//! errors.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use testlens_core::errors::ConfigError;

static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?sm)^\s*/\*.*?\*/").unwrap());
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*//.*$").unwrap());
static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^'\n]*)'|"([^"\n]*)"|`([^`]*)`"#).unwrap());

/// A config source in whichever syntax its extension implies.
pub enum ConfigSource {
    Script(String),
    Data(Value),
}

impl ConfigSource {
    /// `.json` / `.yml` / `.yaml` are parsed; anything else is scraped.
    pub fn load(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let syntax = |message: String| ConfigError::Syntax {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(content)
                .map(ConfigSource::Data)
                .map_err(|e| syntax(e.to_string())),
            Some("yml" | "yaml") => serde_yaml::from_str::<Value>(content)
                .map(ConfigSource::Data)
                .map_err(|e| syntax(e.to_string())),
            _ => Ok(ConfigSource::Script(strip_comments(content))),
        }
    }

    /// A source with no properties.
    pub fn empty() -> Self {
        ConfigSource::Data(Value::Null)
    }

    /// Descend into a nested object (`test` in vitest configs). For scripts
    /// this is the text of the balanced `{...}` following `key:`.
    pub fn section(&self, key: &str) -> Option<ConfigSource> {
        match self {
            ConfigSource::Data(value) => value.get(key).cloned().map(ConfigSource::Data),
            ConfigSource::Script(text) => braced(text, key).map(|body| ConfigSource::Script(body.to_string())),
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        match self {
            ConfigSource::Data(value) => value.get(key)?.as_str().map(str::to_string),
            ConfigSource::Script(text) => string_prop(text, key),
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self {
            ConfigSource::Data(value) => value.get(key)?.as_bool(),
            ConfigSource::Script(text) => bool_prop(text, key),
        }
    }

    /// A string or array-of-strings property, normalised to a list.
    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        match self {
            ConfigSource::Data(value) => match value.get(key)? {
                Value::String(s) => Some(vec![s.clone()]),
                Value::Array(items) => Some(items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()),
                _ => None,
            },
            ConfigSource::Script(text) => array_prop(text, key).or_else(|| string_prop(text, key).map(|s| vec![s])),
        }
    }

    /// Entries of a `projects`-style array: plain strings, or the given
    /// directory key of object entries.
    pub fn project_dirs(&self, key: &str, dir_key: &str) -> Vec<String> {
        match self {
            ConfigSource::Data(value) => match value.get(key) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(o) => o.get(dir_key)?.as_str().map(str::to_string),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            },
            ConfigSource::Script(text) => {
                let Some(body) = bracketed(text, key) else {
                    return Vec::new();
                };
                if body.contains('{') {
                    find_all_string_props(body, dir_key)
                } else {
                    string_literals(body)
                }
            }
        }
    }
}

pub fn strip_comments(content: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(content, "");
    LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
}

fn key_regex(key: &str, value: &str) -> Option<Regex> {
    let pattern = format!(r#"(?:^|[\s,{{])['"]?{}['"]?\s*:\s*{}"#, regex::escape(key), value);
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(key, error = %e, "cannot build config property matcher");
            None
        }
    }
}

/// The match of `re` at the shallowest brace depth; the earliest one wins ties.
fn shallowest<'t>(re: &Regex, text: &'t str) -> Option<Captures<'t>> {
    let mut best: Option<(isize, Captures<'t>)> = None;
    let mut depth = 0isize;
    let mut scanned = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        // The leading separator is not part of the key.
        let lead = whole
            .as_str()
            .chars()
            .next()
            .filter(|c| c.is_whitespace() || matches!(*c, ',' | '{'))
            .map_or(0, char::len_utf8);
        let at = whole.start() + lead;
        depth += brace_delta(&text[scanned..at]);
        scanned = at;
        if best.as_ref().map_or(true, |(d, _)| depth < *d) {
            best = Some((depth, caps));
        }
    }
    best.map(|(_, caps)| caps)
}

fn brace_delta(text: &str) -> isize {
    text.chars().fold(0, |d, c| match c {
        '{' => d + 1,
        '}' => d - 1,
        _ => d,
    })
}

pub fn string_prop(text: &str, key: &str) -> Option<String> {
    let re = key_regex(key, r#"(?:'([^'\n]*)'|"([^"\n]*)"|`([^`]*)`)"#)?;
    let caps = shallowest(&re, text)?;
    (1..=3).find_map(|i| caps.get(i)).map(|m| m.as_str().to_string())
}

fn find_all_string_props(text: &str, key: &str) -> Vec<String> {
    let Some(re) = key_regex(key, r#"(?:'([^'\n]*)'|"([^"\n]*)"|`([^`]*)`)"#) else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| (1..=3).find_map(|i| caps.get(i)).map(|m| m.as_str().to_string()))
        .collect()
}

pub fn bool_prop(text: &str, key: &str) -> Option<bool> {
    let re = key_regex(key, r"(true|false)\b")?;
    Some(shallowest(&re, text)?.get(1)?.as_str() == "true")
}

pub fn array_prop(text: &str, key: &str) -> Option<Vec<String>> {
    bracketed(text, key).map(string_literals)
}

/// The text inside the balanced `[...]` following `key:`.
fn bracketed<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    delimited(text, key, '[', ']')
}

/// The text inside the balanced `{...}` following `key:`.
fn braced<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    delimited(text, key, '{', '}')
}

fn delimited<'t>(text: &'t str, key: &str, open: char, close: char) -> Option<&'t str> {
    let re = key_regex(key, &regex::escape(&open.to_string()))?;
    let start = shallowest(&re, text)?.get(0)?.end();
    let mut depth = 1usize;
    for (i, c) in text[start..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..start + i]);
            }
        }
    }
    None
}

/// Every quoted literal in `text`, in order.
pub fn string_literals(text: &str) -> Vec<String> {
    STRING_LITERAL
        .captures_iter(text)
        .filter_map(|caps| (1..=3).find_map(|i| caps.get(i)).map(|m| m.as_str().to_string()))
        .collect()
}

/// Translate jest's regex-style ignore patterns into globs where the intent
/// is a plain directory name (`/node_modules/`); others are dropped.
pub fn ignore_regex_to_glob(pattern: &str) -> Option<String> {
    let trimmed = pattern.trim_start_matches("<rootDir>").trim_matches('/');
    let plain = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/' | '.'))
        && !trimmed.contains("..");
    if !plain {
        tracing::debug!(pattern, "skipping non-literal ignore pattern");
        return None;
    }
    Some(format!("**/{trimmed}/**"))
}
