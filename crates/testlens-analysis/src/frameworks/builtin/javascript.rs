//! jest, vitest, playwright and mocha.

use std::path::Path;

use testlens_core::errors::ConfigError;

use super::expand_project_dirs;
use super::js_config::{ignore_regex_to_glob, strip_comments, string_literals, ConfigSource};
use crate::frameworks::definition::FrameworkDefinition;
use crate::frameworks::extractors::JsTestExtractor;
use crate::frameworks::matcher::{ContentMatcher, ImportMatcher};
use crate::frameworks::traits::ConfigParser;
use crate::scanner::language_detect::Language;
use crate::scope::globs::resolve_against;
use crate::scope::{ConfigScope, SubProject};

const JS_LANGUAGES: &[Language] = &[Language::JavaScript, Language::TypeScript];

const JEST_API: &str = r"\bjest\.(fn|mock|unmock|spyOn|useFakeTimers|useRealTimers|requireActual|setTimeout)\(";
const VITEST_API: &str = r"\bvi\.(fn|mock|unmock|spyOn|useFakeTimers|useRealTimers|importActual|hoisted|stubGlobal|stubEnv)\(";

pub fn definitions() -> Vec<FrameworkDefinition> {
    vec![
        FrameworkDefinition::builder("jest")
            .languages(JS_LANGUAGES)
            .matcher(ImportMatcher::new(["@jest/globals", "jest"]).with_conflicts(["vitest"]))
            .matcher(ContentMatcher::new([JEST_API]).with_conflicts([VITEST_API]))
            .config_files(&["jest.config.*"])
            .config_parser(JestConfigParser)
            .parser(JsTestExtractor)
            .priority(10)
            .build(),
        FrameworkDefinition::builder("vitest")
            .languages(JS_LANGUAGES)
            .matcher(ImportMatcher::new(["vitest"]).with_conflicts(["@jest/globals"]))
            .matcher(ContentMatcher::new([VITEST_API]).with_conflicts([JEST_API]))
            .config_files(&["vitest.config.*", "vitest.workspace.*"])
            .config_parser(VitestConfigParser)
            .parser(JsTestExtractor)
            .priority(10)
            .build(),
        FrameworkDefinition::builder("playwright")
            .languages(JS_LANGUAGES)
            .matcher(ImportMatcher::new(["@playwright/test"]))
            .matcher(ContentMatcher::new([
                r"\btest\.describe(\.\w+)?\(",
                r"\bpage\.(goto|locator|getByRole|getByText|click)\(",
                r"\bexpect\(page\)",
            ]))
            .config_files(&["playwright.config.*"])
            .config_parser(PlaywrightConfigParser)
            .parser(JsTestExtractor)
            .priority(5)
            .build(),
        FrameworkDefinition::builder("mocha")
            .languages(JS_LANGUAGES)
            .matcher(ImportMatcher::new(["mocha"]))
            .matcher(ContentMatcher::new([r"\bthis\.(timeout|slow|retries)\(\s*\d"]))
            .config_files(&[".mocharc.*"])
            .config_parser(MochaConfigParser)
            .parser(JsTestExtractor)
            .build(),
    ]
}

fn config_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

/// `jest.config.*`: `rootDir`, `roots`, `projects`, `testMatch`,
/// `testPathIgnorePatterns` and `injectGlobals`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JestConfigParser;

impl ConfigParser for JestConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let src = ConfigSource::load(config_path, content)?;
        let dir = config_dir(config_path);
        let base = src
            .string("rootDir")
            .map(|root| resolve_against(dir, &root))
            .unwrap_or_else(|| dir.to_path_buf());
        let base_str = base.to_string_lossy().into_owned();
        let with_root = |p: String| p.replace("<rootDir>", &base_str);

        let include = src.strings("testMatch").unwrap_or_default().into_iter().map(with_root).collect();
        let exclude = src
            .strings("testPathIgnorePatterns")
            .unwrap_or_default()
            .iter()
            .filter_map(|p| ignore_regex_to_glob(p))
            .collect();

        let mut entries = src.strings("roots").unwrap_or_default();
        entries.extend(src.project_dirs("projects", "rootDir"));
        let projects = expand_project_dirs(&base, &entries)
            .into_iter()
            .map(SubProject::new)
            .collect();

        Ok(ConfigScope::new(config_path, base, "jest")
            .with_globals_mode(src.boolean("injectGlobals").unwrap_or(false))
            .with_include(include)
            .with_exclude(exclude)
            .with_projects(projects))
    }
}

/// `vitest.config.*` (`root`, `test.include`, `test.exclude`, `test.globals`,
/// `test.projects`) and `vitest.workspace.*` (a list of project entries).
#[derive(Debug, Default, Clone, Copy)]
pub struct VitestConfigParser;

impl ConfigParser for VitestConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let dir = config_dir(config_path);
        let is_workspace = config_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("vitest.workspace."));
        if is_workspace {
            return Ok(parse_workspace(config_path, dir, content));
        }

        let src = ConfigSource::load(config_path, content)?;
        let base = src
            .string("root")
            .map(|root| resolve_against(dir, &root))
            .unwrap_or_else(|| dir.to_path_buf());
        // Vitest only reads test options from the `test` block.
        let test = src.section("test").unwrap_or_else(ConfigSource::empty);

        let entries = test.project_dirs("projects", "root");
        let projects = expand_project_dirs(&base, &entries)
            .into_iter()
            .map(SubProject::new)
            .collect();

        Ok(ConfigScope::new(config_path, base, "vitest")
            .with_globals_mode(test.boolean("globals").unwrap_or(false))
            .with_include(test.strings("include").unwrap_or_default())
            .with_exclude(test.strings("exclude").unwrap_or_default())
            .with_projects(projects))
    }
}

fn parse_workspace(config_path: &Path, dir: &Path, content: &str) -> ConfigScope {
    let text = strip_comments(content);
    let entries: Vec<String> = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .flat_map(string_literals)
        .filter(|s| !s.is_empty() && !s.starts_with("vitest") && !s.contains(':'))
        .collect();
    let projects = expand_project_dirs(dir, &entries)
        .into_iter()
        .map(SubProject::new)
        .collect();
    ConfigScope::at_config_dir(config_path, "vitest").with_projects(projects)
}

/// `playwright.config.*`: `testDir`, `testMatch`, `testIgnore`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaywrightConfigParser;

impl ConfigParser for PlaywrightConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let src = ConfigSource::load(config_path, content)?;
        let dir = config_dir(config_path);
        let base = src
            .string("testDir")
            .map(|d| resolve_against(dir, &d))
            .unwrap_or_else(|| dir.to_path_buf());
        Ok(ConfigScope::new(config_path, base, "playwright")
            .with_include(src.strings("testMatch").unwrap_or_default())
            .with_exclude(src.strings("testIgnore").unwrap_or_default()))
    }
}

/// `.mocharc.*`: `spec` (string or list) and `ignore`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MochaConfigParser;

impl ConfigParser for MochaConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let src = ConfigSource::load(config_path, content)?;
        Ok(ConfigScope::at_config_dir(config_path, "mocha")
            .with_include(src.strings("spec").unwrap_or_default())
            .with_exclude(src.strings("ignore").unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn jest_root_dir_and_globals() {
        let scope = JestConfigParser
            .parse(
                Path::new("/repo/web/jest.config.js"),
                r#"module.exports = {
                    rootDir: '..',
                    injectGlobals: true,
                    testMatch: ['<rootDir>/src/**/*.test.ts'],
                    testPathIgnorePatterns: ['/node_modules/'],
                }"#,
            )
            .unwrap();
        assert_eq!(scope.base_dir(), Path::new("/repo"));
        assert!(scope.globals_mode());
        assert_eq!(scope.include(), &["/repo/src/**/*.test.ts".to_string()]);
        assert!(scope.contains(Path::new("/repo/src/a/b.test.ts")));
        assert!(!scope.contains(Path::new("/repo/lib/b.test.ts")));
        assert!(!scope.contains(Path::new("/repo/src/node_modules/x.test.ts")));
    }

    #[test]
    fn jest_without_inject_globals() {
        let scope = JestConfigParser
            .parse(Path::new("/repo/jest.config.ts"), "export default { verbose: true }")
            .unwrap();
        assert!(!scope.globals_mode());
        assert_eq!(scope.base_dir(), Path::new("/repo"));
    }

    #[test]
    fn jest_json_config() {
        let scope = JestConfigParser
            .parse(
                Path::new("/repo/jest.config.json"),
                r#"{ "roots": ["<rootDir>/packages/api"], "injectGlobals": true }"#,
            )
            .unwrap();
        assert_eq!(scope.projects().len(), 1);
        assert_eq!(scope.projects()[0].base_dir, PathBuf::from("/repo/packages/api"));
        assert!(scope.contains(Path::new("/repo/packages/api/x.test.js")));
        assert!(!scope.contains(Path::new("/repo/packages/web/x.test.js")));
    }

    #[test]
    fn vitest_nested_test_block() {
        let scope = VitestConfigParser
            .parse(
                Path::new("/repo/vitest.config.ts"),
                "export default defineConfig({ test: { globals: true, include: ['src/**/*.spec.ts'] } })",
            )
            .unwrap();
        assert!(scope.globals_mode());
        assert!(scope.contains(Path::new("/repo/src/x.spec.ts")));
        assert!(!scope.contains(Path::new("/repo/src/x.test.ts")));
    }

    #[test]
    fn vitest_ignores_lookalike_keys_outside_test_block() {
        let scope = VitestConfigParser
            .parse(
                Path::new("/repo/vitest.config.ts"),
                r#"export default defineConfig({
                    optimizeDeps: { include: ['react'] },
                    coverage: { include: ['src/**'] },
                    test: { globals: true },
                })"#,
            )
            .unwrap();
        assert!(scope.include().is_empty());
        assert!(scope.globals_mode());
        assert!(scope.contains(Path::new("/repo/src/a.test.ts")));
        assert!(scope.contains(Path::new("/repo/lib/a.test.ts")));
    }

    #[test]
    fn vitest_without_test_block_has_no_patterns() {
        let scope = VitestConfigParser
            .parse(
                Path::new("/repo/vitest.config.ts"),
                "export default defineConfig({ optimizeDeps: { include: ['react'] }, plugins: [] })",
            )
            .unwrap();
        assert!(scope.include().is_empty());
        assert!(!scope.globals_mode());
        assert!(scope.contains(Path::new("/repo/src/a.test.ts")));
    }

    #[test]
    fn vitest_workspace_projects() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/ui")).unwrap();
        fs::create_dir_all(dir.path().join("packages/core")).unwrap();
        let config = dir.path().join("vitest.workspace.ts");
        let scope = VitestConfigParser
            .parse(
                &config,
                "import { defineWorkspace } from 'vitest/config'\nexport default defineWorkspace(['packages/*'])\n",
            )
            .unwrap();
        assert_eq!(scope.projects().len(), 2);
        assert!(scope.contains(&dir.path().join("packages/ui/a.test.ts")));
        assert!(!scope.contains(&dir.path().join("tools/a.test.ts")));
    }

    #[test]
    fn playwright_test_dir() {
        let scope = PlaywrightConfigParser
            .parse(
                Path::new("/repo/playwright.config.ts"),
                "export default defineConfig({ testDir: './e2e', testIgnore: '**/fixtures/**' })",
            )
            .unwrap();
        assert_eq!(scope.base_dir(), Path::new("/repo/e2e"));
        assert!(scope.contains(Path::new("/repo/e2e/login.spec.ts")));
        assert!(!scope.contains(Path::new("/repo/src/login.spec.ts")));
        assert!(!scope.contains(Path::new("/repo/e2e/fixtures/x.spec.ts")));
    }

    #[test]
    fn mocha_spec() {
        let scope = MochaConfigParser
            .parse(Path::new("/repo/.mocharc.json"), r#"{ "spec": "test/**/*.spec.js" }"#)
            .unwrap();
        assert!(scope.contains(Path::new("/repo/test/unit/a.spec.js")));
        assert!(!scope.contains(Path::new("/repo/src/a.spec.js")));
    }
}
