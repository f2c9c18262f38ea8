//! Framework definitions: the unit of registration.

use std::fmt;

use super::matcher::ConfigFileMatcher;
use super::traits::{ConfigParser, Matcher, StructuralParser};
use super::types::{MatchResult, Signal};
use crate::scanner::language_detect::Language;

/// Everything the detector and scanner need to know about one test framework.
pub struct FrameworkDefinition {
    pub name: String,
    pub languages: Vec<Language>,
    pub matchers: Vec<Box<dyn Matcher>>,
    /// Base-name globs of configuration files, e.g. `jest.config.*`.
    pub config_patterns: Vec<String>,
    pub config_parser: Option<Box<dyn ConfigParser>>,
    pub parser: Option<Box<dyn StructuralParser>>,
    /// Orders matcher evaluation across frameworks. Never used to pick a winner.
    pub priority: i32,
    /// Identified by file name alone (e.g. `*_test.go`).
    pub filename_only: bool,
}

impl FrameworkDefinition {
    pub fn builder(name: impl Into<String>) -> FrameworkBuilder {
        FrameworkBuilder {
            def: FrameworkDefinition {
                name: name.into(),
                languages: Vec::new(),
                matchers: Vec::new(),
                config_patterns: Vec::new(),
                config_parser: None,
                parser: None,
                priority: 0,
                filename_only: false,
            },
        }
    }

    pub fn supports(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// Run every matcher over one signal and fold the verdicts.
    pub fn match_signal(&self, signal: &Signal<'_>) -> MatchResult {
        let mut result = MatchResult::none();
        for matcher in &self.matchers {
            let verdict = matcher.matches(signal);
            if verdict.has_opinion() {
                result.merge(verdict);
            }
        }
        result
    }

    pub fn has_config(&self) -> bool {
        self.config_parser.is_some() && !self.config_patterns.is_empty()
    }
}

impl fmt::Debug for FrameworkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkDefinition")
            .field("name", &self.name)
            .field("languages", &self.languages)
            .field("matchers", &self.matchers.len())
            .field("config_patterns", &self.config_patterns)
            .field("has_config_parser", &self.config_parser.is_some())
            .field("has_parser", &self.parser.is_some())
            .field("priority", &self.priority)
            .field("filename_only", &self.filename_only)
            .finish()
    }
}

pub struct FrameworkBuilder {
    def: FrameworkDefinition,
}

impl FrameworkBuilder {
    pub fn languages(mut self, languages: &[Language]) -> Self {
        self.def.languages = languages.to_vec();
        self
    }

    pub fn matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.def.matchers.push(Box::new(matcher));
        self
    }

    /// Registers config-file globs and a matcher recognising them.
    pub fn config_files(mut self, patterns: &[&str]) -> Self {
        self.def.config_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self.def
            .matchers
            .push(Box::new(ConfigFileMatcher::new(patterns.iter().copied())));
        self
    }

    pub fn config_parser(mut self, parser: impl ConfigParser + 'static) -> Self {
        self.def.config_parser = Some(Box::new(parser));
        self
    }

    pub fn parser(mut self, parser: impl StructuralParser + 'static) -> Self {
        self.def.parser = Some(Box::new(parser));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.def.priority = priority;
        self
    }

    pub fn filename_only(mut self) -> Self {
        self.def.filename_only = true;
        self
    }

    pub fn build(self) -> FrameworkDefinition {
        self.def
    }
}
