//! Concrete matchers.
//!
//! Patterns are compiled once at construction. Invalid regexes or globs are
//! logged and dropped; the matcher keeps working with whatever compiled.

use glob::Pattern;
use regex::{Regex, RegexSet};

use super::traits::Matcher;
use super::types::{MatchResult, Signal, SignalKind};

/// Matches import/require module specifiers.
///
/// A specifier matches a module when it equals it or extends it across a
/// path-like boundary (`/`, `.` or `\`), so `vitest/config` matches `vitest`
/// but `vitest-mock` does not. Conflicting modules produce a negative result.
#[derive(Debug, Clone, Default)]
pub struct ImportMatcher {
    modules: Vec<String>,
    conflicts: Vec<String>,
}

impl ImportMatcher {
    pub fn new<S: Into<String>>(modules: impl IntoIterator<Item = S>) -> Self {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            conflicts: Vec::new(),
        }
    }

    pub fn with_conflicts<S: Into<String>>(mut self, conflicts: impl IntoIterator<Item = S>) -> Self {
        self.conflicts = conflicts.into_iter().map(Into::into).collect();
        self
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }
}

fn module_matches(specifier: &str, module: &str) -> bool {
    match specifier.strip_prefix(module) {
        Some("") => true,
        Some(rest) => rest.starts_with(['/', '.', '\\']),
        None => false,
    }
}

impl Matcher for ImportMatcher {
    fn matches(&self, signal: &Signal<'_>) -> MatchResult {
        if signal.kind != SignalKind::Import {
            return MatchResult::none();
        }
        let specifier = signal.value.trim_start_matches('\\');
        if self.conflicts.iter().any(|c| module_matches(specifier, c)) {
            return MatchResult::negative(vec![specifier.to_string()]);
        }
        if self.modules.iter().any(|m| module_matches(specifier, m)) {
            return MatchResult::positive(100, vec![specifier.to_string()]);
        }
        MatchResult::none()
    }
}

/// Regex-based body matcher. A cheap [`RegexSet`] pass reports every pattern
/// that hit; conflicting patterns veto the framework.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    patterns: RegexSet,
    conflicts: RegexSet,
}

impl ContentMatcher {
    pub fn new<'p>(patterns: impl IntoIterator<Item = &'p str>) -> Self {
        Self {
            patterns: compile_set(patterns),
            conflicts: RegexSet::empty(),
        }
    }

    pub fn with_conflicts<'p>(mut self, conflicts: impl IntoIterator<Item = &'p str>) -> Self {
        self.conflicts = compile_set(conflicts);
        self
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

fn compile_set<'p>(patterns: impl IntoIterator<Item = &'p str>) -> RegexSet {
    let valid: Vec<&str> = patterns
        .into_iter()
        .filter(|p| match Regex::new(p) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(pattern = %p, error = %e, "dropping invalid content pattern");
                false
            }
        })
        .collect();
    // Every member compiled on its own above, so the set compiles too.
    RegexSet::new(&valid).unwrap_or_else(|_| RegexSet::empty())
}

fn hits(set: &RegexSet, text: &str) -> Vec<String> {
    set.matches(text)
        .into_iter()
        .map(|i| set.patterns()[i].clone())
        .collect()
}

impl Matcher for ContentMatcher {
    fn matches(&self, signal: &Signal<'_>) -> MatchResult {
        if signal.kind != SignalKind::Content {
            return MatchResult::none();
        }
        let conflicting = hits(&self.conflicts, signal.value);
        if !conflicting.is_empty() {
            return MatchResult::negative(conflicting);
        }
        let matched = hits(&self.patterns, signal.value);
        if matched.is_empty() {
            MatchResult::none()
        } else {
            MatchResult::positive(100, matched)
        }
    }
}

/// Matches a file's base name against naming-convention globs.
#[derive(Debug, Clone, Default)]
pub struct FilenameMatcher {
    globs: Vec<Pattern>,
}

impl FilenameMatcher {
    pub fn new<'p>(globs: impl IntoIterator<Item = &'p str>) -> Self {
        Self {
            globs: compile_globs(globs, "filename"),
        }
    }
}

impl Matcher for FilenameMatcher {
    fn matches(&self, signal: &Signal<'_>) -> MatchResult {
        if signal.kind != SignalKind::Filename {
            return MatchResult::none();
        }
        glob_result(&self.globs, signal.value)
    }
}

/// Recognises a framework's configuration files by base name.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileMatcher {
    globs: Vec<Pattern>,
}

impl ConfigFileMatcher {
    pub fn new<'p>(globs: impl IntoIterator<Item = &'p str>) -> Self {
        Self {
            globs: compile_globs(globs, "config-file"),
        }
    }
}

impl Matcher for ConfigFileMatcher {
    fn matches(&self, signal: &Signal<'_>) -> MatchResult {
        if signal.kind != SignalKind::ConfigFile {
            return MatchResult::none();
        }
        glob_result(&self.globs, signal.value)
    }
}

fn compile_globs<'p>(globs: impl IntoIterator<Item = &'p str>, what: &str) -> Vec<Pattern> {
    globs
        .into_iter()
        .filter_map(|g| match Pattern::new(g) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(pattern = %g, kind = what, error = %e, "dropping invalid glob");
                None
            }
        })
        .collect()
}

fn glob_result(globs: &[Pattern], name: &str) -> MatchResult {
    let matched: Vec<String> = globs
        .iter()
        .filter(|g| g.matches(name))
        .map(|g| g.as_str().to_string())
        .collect();
    if matched.is_empty() {
        MatchResult::none()
    } else {
        MatchResult::positive(100, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_boundary() {
        let m = ImportMatcher::new(["vitest"]);
        assert!(m.matches(&Signal::import("vitest")).is_match());
        assert!(m.matches(&Signal::import("vitest/config")).is_match());
        assert!(!m.matches(&Signal::import("vitest-mock")).has_opinion());
    }

    #[test]
    fn import_conflict_is_negative() {
        let m = ImportMatcher::new(["org.junit"]).with_conflicts(["org.junit.jupiter"]);
        let r = m.matches(&Signal::import("org.junit.jupiter.api.Test"));
        assert!(r.negative);
        assert!(m.matches(&Signal::import("org.junit.Test")).is_match());
    }

    #[test]
    fn php_namespaces_match_on_backslash() {
        let m = ImportMatcher::new(["PHPUnit"]);
        assert!(m.matches(&Signal::import("\\PHPUnit\\Framework\\TestCase")).is_match());
    }

    #[test]
    fn matchers_ignore_other_signal_kinds() {
        let content = ContentMatcher::new([r"\bjest\.fn\("]);
        assert!(!content.matches(&Signal::import("jest")).has_opinion());
        let file = FilenameMatcher::new(["*_test.go"]);
        assert!(!file.matches(&Signal::config_file("x_test.go")).has_opinion());
    }

    #[test]
    fn content_reports_each_hit() {
        let m = ContentMatcher::new([r"\bjest\.fn\(", r"\bjest\.mock\(", r"never"]);
        let r = m.matches(&Signal::content("jest.fn(); jest.mock('x')", b""));
        assert!(r.is_match());
        assert_eq!(r.evidence.len(), 2);
    }

    #[test]
    fn invalid_patterns_are_dropped() {
        let m = ContentMatcher::new([r"(unclosed", r"\bvi\.fn\("]);
        assert_eq!(m.pattern_count(), 1);
        assert!(m.matches(&Signal::content("vi.fn()", b"")).is_match());

        let f = FilenameMatcher::new(["[", "*.spec.ts"]);
        assert!(f.matches(&Signal::filename("a.spec.ts")).is_match());
    }

    #[test]
    fn config_file_globs() {
        let m = ConfigFileMatcher::new(["jest.config.*"]);
        assert!(m.matches(&Signal::config_file("jest.config.ts")).is_match());
        assert!(!m.matches(&Signal::config_file("vitest.config.ts")).has_opinion());
    }
}
