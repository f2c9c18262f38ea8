//! Glob handling for patterns found in framework configs.
//!
//! Config files use brace alternation (`*.{ts,js}`) and extglob groups
//! (`?(x)`, `@(a|b)`, `+(a|b)`) that `glob::Pattern` does not understand, so
//! patterns are expanded into plain alternatives before compiling.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

/// Upper bound on alternatives produced from one pattern.
const MAX_EXPANSIONS: usize = 64;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `{a,b}` and `?(a|b)` / `@(a|b)` / `+(a|b)` groups.
pub fn expand(pattern: &str) -> Vec<String> {
    let mut out = Vec::new();
    expand_into(pattern, &mut out);
    out.dedup();
    out
}

fn expand_into(pattern: &str, out: &mut Vec<String>) {
    if out.len() >= MAX_EXPANSIONS {
        return;
    }
    let Some((start, open_len, close, optional)) = first_group(pattern) else {
        out.push(pattern.to_string());
        return;
    };
    let prefix = &pattern[..start];
    let body = &pattern[start + open_len..close];
    let suffix = &pattern[close + 1..];
    let separator = if open_len == 1 { ',' } else { '|' };

    let mut alternatives: Vec<&str> = split_top_level(body, separator);
    if optional {
        alternatives.insert(0, "");
    }
    for alt in alternatives {
        expand_into(&format!("{prefix}{alt}{suffix}"), out);
    }
}

/// Locate the first group: (start, opener length, closing index, optional).
fn first_group(pattern: &str) -> Option<(usize, usize, usize, bool)> {
    let bytes = pattern.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let (open_len, optional, close_char) = match b {
            b'{' => (1, false, b'}'),
            b'?' | b'@' | b'+' if bytes.get(i + 1) == Some(&b'(') => (2, b == b'?', b')'),
            _ => continue,
        };
        let open_char = bytes[i + open_len - 1];
        let mut depth = 0usize;
        for (j, &c) in bytes.iter().enumerate().skip(i + open_len - 1) {
            if c == open_char {
                depth += 1;
            } else if c == close_char {
                depth -= 1;
                if depth == 0 {
                    return Some((i, open_len, j, optional));
                }
            }
        }
        return None;
    }
    None
}

fn split_top_level(body: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&body[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[last..]);
    parts
}

/// A compiled config pattern set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

impl GlobSet {
    /// Compile patterns; anything that fails to compile is logged and dropped.
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::new();
        for raw in patterns {
            for expanded in expand(raw) {
                let normalized = expanded.strip_prefix("./").unwrap_or(&expanded).to_string();
                match Pattern::new(&normalized) {
                    Ok(p) => compiled.push(p),
                    Err(e) => {
                        tracing::warn!(pattern = %raw, error = %e, "ignoring malformed glob")
                    }
                }
            }
        }
        Self { patterns: compiled }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Match a path relative to `base`, plus its absolute form for patterns
    /// that were written absolute. Patterns without a `/` match the file name.
    pub fn matches(&self, relative: &Path, absolute: &Path) -> bool {
        let rel = to_slash(relative);
        let abs = to_slash(absolute);
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.patterns.iter().any(|p| {
            let s = p.as_str();
            if s.starts_with('/') {
                p.matches_with(&abs, MATCH_OPTIONS)
            } else if !s.contains('/') {
                p.matches_with(&name, MATCH_OPTIONS)
            } else {
                p.matches_with(&rel, MATCH_OPTIONS)
            }
        })
    }
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically normalise `.` and `..` components without touching the disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve a config-relative path (which may use `<rootDir>`) against `dir`.
pub fn resolve_against(dir: &Path, value: &str) -> PathBuf {
    let value = value.trim();
    let stripped = value
        .strip_prefix("<rootDir>")
        .map(|rest| rest.trim_start_matches('/'));
    match stripped {
        Some(rest) if rest.is_empty() => normalize(dir),
        Some(rest) => normalize(&dir.join(rest)),
        None => normalize(&dir.join(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_expansion() {
        assert_eq!(expand("src/**/*.{ts,js}"), vec!["src/**/*.ts", "src/**/*.js"]);
        assert_eq!(expand("plain/*.ts"), vec!["plain/*.ts"]);
    }

    #[test]
    fn extglob_optional_group() {
        assert_eq!(
            expand("**/*.[jt]s?(x)"),
            vec!["**/*.[jt]s", "**/*.[jt]sx"]
        );
    }

    #[test]
    fn nested_groups_expand_fully() {
        let all = expand("*.{spec,test}.{ts,js}");
        assert_eq!(all.len(), 4);
        assert!(all.contains(&"*.test.js".to_string()));
    }

    #[test]
    fn unbalanced_group_stays_literal() {
        assert_eq!(expand("weird{a,b"), vec!["weird{a,b"]);
    }

    #[test]
    fn set_matching_modes() {
        let set = GlobSet::new(&["**/__tests__/**/*.ts".into(), "*.spec.ts".into()]);
        assert!(set.matches(Path::new("src/__tests__/a.ts"), Path::new("/p/src/__tests__/a.ts")));
        assert!(set.matches(Path::new("deep/x.spec.ts"), Path::new("/p/deep/x.spec.ts")));
        assert!(!set.matches(Path::new("src/a.ts"), Path::new("/p/src/a.ts")));
    }

    #[test]
    fn malformed_globs_are_dropped() {
        let set = GlobSet::new(&["[".into()]);
        assert!(set.is_empty());
    }

    #[test]
    fn root_dir_token() {
        let dir = Path::new("/repo/app");
        assert_eq!(resolve_against(dir, "<rootDir>/src"), PathBuf::from("/repo/app/src"));
        assert_eq!(resolve_against(dir, "<rootDir>"), PathBuf::from("/repo/app"));
        assert_eq!(resolve_against(dir, "../lib"), PathBuf::from("/repo/lib"));
        assert_eq!(resolve_against(dir, "./"), PathBuf::from("/repo/app"));
    }
}
