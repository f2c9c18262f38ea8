//! The per-file detector.

use std::path::Path;
use std::sync::Arc;

use testlens_core::constants::MAX_CONFIDENCE;
use testlens_core::ScanConfig;

use super::evidence::{Evidence, EvidenceKind, EvidenceSource};
use super::imports::extract_imports;
use super::result::DetectionResult;
use crate::frameworks::{FrameworkDefinition, FrameworkRegistry, MatchResult, Signal};
use crate::scanner::language_detect::Language;
use crate::scope::{AggregatedProjectScope, ConfigScope, ScopeResolver};

/// Combines scope, import, content and filename signals into one verdict.
///
/// Every stage accumulates evidence; only language gating returns early.
pub struct Detector {
    registry: Arc<FrameworkRegistry>,
    resolver: ScopeResolver,
}

impl Detector {
    pub fn new(registry: Arc<FrameworkRegistry>) -> Self {
        Self::with_resolver(registry, ScopeResolver::new())
    }

    pub fn with_resolver(registry: Arc<FrameworkRegistry>, resolver: ScopeResolver) -> Self {
        Self { registry, resolver }
    }

    /// A detector whose filesystem scope walk honours `config.max_scope_depth`.
    pub fn from_config(registry: Arc<FrameworkRegistry>, config: &ScanConfig) -> Self {
        Self::with_resolver(
            registry,
            ScopeResolver::with_max_depth(config.effective_max_scope_depth()),
        )
    }

    pub fn registry(&self) -> &FrameworkRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Detect with scopes found by walking the filesystem from `path`.
    pub fn detect(&self, path: &Path, content: &[u8]) -> DetectionResult {
        let Some(language) = Language::from_path(path) else {
            return DetectionResult::unknown();
        };
        let scopes = self.resolver.resolve_scopes(path, language, &self.registry);
        let project = AggregatedProjectScope::from_scopes(scopes);
        self.detect_language(path, content, language, &project)
    }

    /// Detect against a pre-built project scope; never touches the filesystem.
    pub fn detect_with_scope(
        &self,
        path: &Path,
        content: &[u8],
        project: &AggregatedProjectScope,
    ) -> DetectionResult {
        let Some(language) = Language::from_path(path) else {
            return DetectionResult::unknown();
        };
        self.detect_language(path, content, language, project)
    }

    fn detect_language(
        &self,
        path: &Path,
        content: &[u8],
        language: Language,
        project: &AggregatedProjectScope,
    ) -> DetectionResult {
        let candidates: Vec<&FrameworkDefinition> = self.registry.for_language(language).collect();
        if candidates.is_empty() {
            return DetectionResult::unknown();
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        if let [only] = candidates.as_slice() {
            if only.filename_only {
                if let Some(result) = filename_fast_path(only, file_name) {
                    return result;
                }
            }
        }

        let mut tally = Tally::new(&candidates);

        let scope = project.find_scope(path, |s| candidates.iter().any(|c| c.name == s.framework()));
        if let Some(scope) = &scope {
            tally.add(Evidence::positive(
                scope.framework(),
                EvidenceSource::ConfigScope,
                EvidenceKind::ScopeMatch {
                    config_path: scope.config_path().to_path_buf(),
                },
            ));
            if scope.globals_mode() {
                tally.add(Evidence::positive(
                    scope.framework(),
                    EvidenceSource::GlobalsMode,
                    EvidenceKind::GlobalsEnabled {
                        config_path: scope.config_path().to_path_buf(),
                    },
                ));
            }
        }

        let text = String::from_utf8_lossy(content);
        for module in extract_imports(language, &text) {
            let signal = Signal::import(&module);
            for def in &candidates {
                let verdict = def.match_signal(&signal);
                tally.record(def, EvidenceSource::Import, verdict, |negative, _| {
                    if negative {
                        EvidenceKind::ImportConflict { module: module.clone() }
                    } else {
                        EvidenceKind::ImportMatched { module: module.clone() }
                    }
                });
            }
        }

        let signal = Signal::content(&text, content);
        for def in &candidates {
            let verdict = def.match_signal(&signal);
            tally.record(def, EvidenceSource::Content, verdict, |negative, patterns| {
                if negative {
                    EvidenceKind::ContentConflict { patterns }
                } else {
                    EvidenceKind::ContentPattern { patterns }
                }
            });
        }

        let signal = Signal::filename(file_name);
        for def in &candidates {
            let verdict = def.match_signal(&signal);
            tally.record(def, EvidenceSource::Filename, verdict, |negative, patterns| {
                if negative {
                    EvidenceKind::FilenameConflict { patterns }
                } else {
                    EvidenceKind::FilenameConvention { patterns }
                }
            });
        }

        let result = tally.select(scope);
        tracing::trace!(
            path = %path.display(),
            framework = %result.framework,
            confidence = result.confidence,
            "detected"
        );
        result
    }
}

fn filename_fast_path(def: &FrameworkDefinition, file_name: &str) -> Option<DetectionResult> {
    let verdict = def.match_signal(&Signal::filename(file_name));
    if !verdict.is_match() {
        return None;
    }
    let evidence = Evidence::weighted(
        &def.name,
        EvidenceSource::Filename,
        EvidenceKind::FilenameConvention {
            patterns: verdict.evidence,
        },
        u32::from(MAX_CONFIDENCE),
    );
    Some(DetectionResult {
        framework: def.name.clone(),
        confidence: MAX_CONFIDENCE,
        source: Some(EvidenceSource::Filename),
        scope: None,
        evidence: vec![evidence],
    })
}

/// Evidence accumulated per candidate, in candidate order.
struct Tally<'r> {
    entries: Vec<(&'r FrameworkDefinition, Vec<Evidence>)>,
}

impl<'r> Tally<'r> {
    fn new(candidates: &[&'r FrameworkDefinition]) -> Self {
        Self {
            entries: candidates.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// Add evidence unless an identical entry is already recorded.
    fn add(&mut self, evidence: Evidence) {
        let Some((_, list)) = self.entries.iter_mut().find(|(d, _)| d.name == evidence.framework) else {
            return;
        };
        let duplicate = list
            .iter()
            .any(|e| e.source == evidence.source && e.kind == evidence.kind && e.negative == evidence.negative);
        if !duplicate {
            list.push(evidence);
        }
    }

    /// Turn a matcher verdict into evidence of `source`'s fixed weight.
    fn record(
        &mut self,
        def: &FrameworkDefinition,
        source: EvidenceSource,
        verdict: MatchResult,
        kind: impl FnOnce(bool, Vec<String>) -> EvidenceKind,
    ) {
        if !verdict.has_opinion() {
            return;
        }
        let negative = verdict.negative;
        let kind = kind(negative, verdict.evidence);
        self.add(if negative {
            Evidence::negative(&def.name, source, kind)
        } else {
            Evidence::positive(&def.name, source, kind)
        });
    }

    fn select(self, scope: Option<Arc<ConfigScope>>) -> DetectionResult {
        struct Standing<'a> {
            name: &'a str,
            has_import: bool,
            confidence: u8,
        }

        let standings: Vec<Standing<'_>> = self
            .entries
            .iter()
            .filter(|(_, evidence)| !evidence.iter().any(|e| e.negative))
            .map(|(def, evidence)| Standing {
                name: &def.name,
                has_import: evidence.iter().any(|e| e.source == EvidenceSource::Import),
                confidence: capped_sum(evidence),
            })
            .filter(|s| s.confidence > 0)
            .collect();

        let winner = standings.iter().min_by(|a, b| {
            b.has_import
                .cmp(&a.has_import)
                .then(b.confidence.cmp(&a.confidence))
                .then(a.name.cmp(b.name))
        });
        let Some(winner) = winner else {
            let mut unknown = DetectionResult::unknown();
            unknown.evidence = self.entries.into_iter().flat_map(|(_, e)| e).collect();
            return unknown;
        };

        let framework = winner.name.to_string();
        let confidence = winner.confidence;
        let mut evidence = Vec::new();
        let mut rest = Vec::new();
        for (def, list) in self.entries {
            if def.name == framework {
                evidence.extend(list);
            } else {
                rest.extend(list);
            }
        }
        let source = evidence
            .iter()
            .filter(|e| !e.negative)
            .max_by(|a, b| a.weight.cmp(&b.weight).then(b.source.cmp(&a.source)))
            .map(|e| e.source);
        evidence.extend(rest);

        DetectionResult {
            scope: scope.filter(|s| s.framework() == framework),
            framework,
            confidence,
            source,
            evidence,
        }
    }
}

/// Sum of positive weights, capped.
fn capped_sum(evidence: &[Evidence]) -> u8 {
    let total: u32 = evidence.iter().filter(|e| !e.negative).map(|e| e.weight).sum();
    total.min(u32::from(MAX_CONFIDENCE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn detector() -> Detector {
        Detector::new(Arc::new(FrameworkRegistry::with_builtins()))
    }

    fn jest_scope(globals: bool) -> AggregatedProjectScope {
        AggregatedProjectScope::from_scopes([Arc::new(
            ConfigScope::new("/proj/apps/web/jest.config.js", "/proj/apps/web", "jest")
                .with_globals_mode(globals),
        )])
    }

    const FILE: &str = "/proj/apps/web/__tests__/user.test.ts";
    const BODY: &str = "describe('user', () => {\n  it('works', () => {\n    expect(1).toBe(1)\n  })\n})\n";

    #[test]
    fn scope_only_is_eighty() {
        let r = detector().detect_with_scope(Path::new(FILE), BODY.as_bytes(), &jest_scope(false));
        assert_eq!(r.framework, "jest");
        assert_eq!(r.confidence, 80);
        assert_eq!(r.source, Some(EvidenceSource::ConfigScope));
        assert!(r.scope.is_some());
    }

    #[test]
    fn globals_mode_adds_ten() {
        let r = detector().detect_with_scope(Path::new(FILE), BODY.as_bytes(), &jest_scope(true));
        assert_eq!(r.confidence, 90);
        assert_eq!(r.source, Some(EvidenceSource::ConfigScope));
    }

    #[test]
    fn import_beats_scope() {
        let body = format!("import {{ describe }} from 'vitest'\n{BODY}");
        let r = detector().detect_with_scope(Path::new(FILE), body.as_bytes(), &jest_scope(true));
        assert_eq!(r.framework, "vitest");
        assert_eq!(r.confidence, 60);
        assert_eq!(r.source, Some(EvidenceSource::Import));
        assert!(r.scope.is_none());
        // jest was vetoed by the conflicting import
        assert!(r.evidence_for("jest").any(|e| e.negative));
    }

    #[test]
    fn unsupported_language_is_unknown() {
        let r = detector().detect_with_scope(Path::new("/p/readme.md"), b"", &AggregatedProjectScope::new());
        assert!(r.is_unknown());
        assert_eq!(r.confidence, 0);
    }

    #[test]
    fn go_fast_path() {
        let r = detector().detect_with_scope(Path::new("/p/x_test.go"), b"package x", &AggregatedProjectScope::new());
        assert_eq!(r.framework, "go-testing");
        assert_eq!(r.confidence, 100);
        assert_eq!(r.evidence.len(), 1);
    }

    #[test]
    fn scopes_for_other_languages_are_ignored() {
        let project = AggregatedProjectScope::from_scopes([Arc::new(ConfigScope::new(
            PathBuf::from("/proj/pytest.ini"),
            "/proj",
            "pytest",
        ))]);
        let r = detector().detect_with_scope(Path::new("/proj/a.test.ts"), BODY.as_bytes(), &project);
        assert!(r.is_unknown());
    }

    #[test]
    fn confidence_is_capped() {
        let body = "import { vi } from 'vitest'\nimport { expect } from 'vitest/expect'\nvi.fn()\n";
        let project = AggregatedProjectScope::from_scopes([Arc::new(
            ConfigScope::new("/p/vitest.config.ts", "/p", "vitest").with_globals_mode(true),
        )]);
        let r = detector().detect_with_scope(Path::new("/p/a.test.ts"), body.as_bytes(), &project);
        assert_eq!(r.framework, "vitest");
        assert_eq!(r.confidence, 100);
    }
}
