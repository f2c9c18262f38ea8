//! Property tests for confidence bounds and negative-evidence vetoes.

use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use testlens_analysis::{AggregatedProjectScope, ConfidenceLevel, ConfigScope, Detector, FrameworkRegistry};

const IMPORTS: &[&str] = &["vitest", "@jest/globals", "jest", "@playwright/test", "mocha", "chai", "./helpers"];
const SNIPPETS: &[&str] = &[
    "jest.fn()",
    "jest.mock('./db')",
    "vi.fn()",
    "vi.mock('./db')",
    "describe('x', () => {})",
    "test('y', async ({ page }) => {})",
];
const SCOPES: &[&str] = &["jest", "vitest", "playwright", "mocha"];

fn body(imports: &[usize], snippets: &[usize]) -> String {
    let mut out = String::new();
    for &i in imports {
        out.push_str(&format!("import x{i} from '{}'\n", IMPORTS[i]));
    }
    for &s in snippets {
        out.push_str(SNIPPETS[s]);
        out.push('\n');
    }
    out
}

fn project(scope: Option<(usize, bool)>) -> AggregatedProjectScope {
    match scope {
        Some((i, globals)) => AggregatedProjectScope::from_scopes([Arc::new(
            ConfigScope::new(format!("/p/{}.config.js", SCOPES[i]), "/p", SCOPES[i]).with_globals_mode(globals),
        )]),
        None => AggregatedProjectScope::new(),
    }
}

proptest! {
    #[test]
    fn confidence_is_bounded_and_vetoes_hold(
        imports in proptest::collection::vec(0..IMPORTS.len(), 0..4),
        snippets in proptest::collection::vec(0..SNIPPETS.len(), 0..4),
        scope in proptest::option::of((0..SCOPES.len(), any::<bool>())),
        dot_spec in any::<bool>(),
    ) {
        let detector = Detector::new(Arc::new(FrameworkRegistry::with_builtins()));
        let file = if dot_spec { "/p/src/a.spec.ts" } else { "/p/src/a.test.ts" };
        let text = body(&imports, &snippets);
        let r = detector.detect_with_scope(Path::new(file), text.as_bytes(), &project(scope));

        prop_assert!(r.confidence <= 100);
        prop_assert_eq!(r.level(), ConfidenceLevel::from_score(r.confidence));
        if r.is_unknown() {
            prop_assert_eq!(r.confidence, 0);
        } else {
            prop_assert!(r.evidence_for(&r.framework).all(|e| !e.negative));
            let sum: u32 = r.evidence_for(&r.framework).map(|e| e.weight).sum();
            prop_assert_eq!(u32::from(r.confidence), sum.min(100));
        }
    }

    #[test]
    fn levels_partition_the_score_range(score in 0u8..=100) {
        let level = ConfidenceLevel::from_score(score);
        let expected = match score {
            0 => ConfidenceLevel::None,
            1..=30 => ConfidenceLevel::Weak,
            31..=70 => ConfidenceLevel::Moderate,
            _ => ConfidenceLevel::Definite,
        };
        prop_assert_eq!(level, expected);
    }
}
