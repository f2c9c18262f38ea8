//! pytest.

use std::path::Path;

use testlens_core::errors::ConfigError;
use testlens_core::FxHashMap;

use super::expand_project_dirs;
use crate::frameworks::definition::FrameworkDefinition;
use crate::frameworks::extractors::PytestExtractor;
use crate::frameworks::matcher::{ContentMatcher, FilenameMatcher, ImportMatcher};
use crate::frameworks::traits::ConfigParser;
use crate::scanner::language_detect::Language;
use crate::scope::{ConfigScope, SubProject};

pub fn definitions() -> Vec<FrameworkDefinition> {
    vec![FrameworkDefinition::builder("pytest")
        .languages(&[Language::Python])
        .matcher(ImportMatcher::new(["pytest", "_pytest"]))
        .matcher(ContentMatcher::new([
            r"@pytest\.(fixture|mark)\b",
            r"\bpytest\.(raises|approx|skip|fail|param)\(",
        ]))
        .matcher(FilenameMatcher::new(["test_*.py", "*_test.py"]))
        .config_files(&["pytest.ini", "pyproject.toml", "tox.ini", "setup.cfg", "conftest.py"])
        .config_parser(PytestConfigParser)
        .parser(PytestExtractor)
        .priority(10)
        .build()]
}

/// pytest's config files. `testpaths` become sub-projects and
/// `python_files` the include patterns.
///
/// - `pytest.ini`: `[pytest]`; the file counts even without that section
/// - `pyproject.toml`: `[tool.pytest.ini_options]`
/// - `tox.ini`: `[pytest]`
/// - `setup.cfg`: `[tool:pytest]`
/// - `conftest.py`: claims its directory
///
/// The shared files yield [`ConfigError::NotApplicable`] when they carry no
/// pytest section.
#[derive(Debug, Default, Clone, Copy)]
pub struct PytestConfigParser;

impl ConfigParser for PytestConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let scope = ConfigScope::at_config_dir(config_path, "pytest");
        let syntax = |message: String| ConfigError::Syntax {
            path: config_path.to_path_buf(),
            message,
        };
        let not_applicable = || ConfigError::NotApplicable {
            path: config_path.to_path_buf(),
            framework: "pytest".to_string(),
        };
        let name = config_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        let options = match name {
            "conftest.py" => return Ok(scope),
            "pyproject.toml" => {
                let table: toml::Table = toml::from_str(content).map_err(|e| syntax(e.to_string()))?;
                pyproject_options(&table).ok_or_else(not_applicable)?
            }
            _ => {
                let mut sections = parse_ini(content).map_err(syntax)?;
                let section = match name {
                    "setup.cfg" => "tool:pytest",
                    _ => "pytest",
                };
                match sections.remove(section) {
                    Some(options) => PytestOptions::from_ini(&options),
                    None if name == "pytest.ini" => PytestOptions::default(),
                    None => return Err(not_applicable()),
                }
            }
        };

        let projects = expand_project_dirs(scope.base_dir(), &options.testpaths)
            .into_iter()
            .map(SubProject::new)
            .collect();
        Ok(scope.with_include(options.python_files).with_projects(projects))
    }
}

#[derive(Debug, Default)]
struct PytestOptions {
    testpaths: Vec<String>,
    python_files: Vec<String>,
}

impl PytestOptions {
    fn from_ini(options: &FxHashMap<String, String>) -> Self {
        let words = |key: &str| -> Vec<String> {
            options
                .get(key)
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        };
        Self {
            testpaths: words("testpaths"),
            python_files: words("python_files"),
        }
    }
}

/// `[tool.pytest.ini_options]`, whose values are TOML strings or arrays.
fn pyproject_options(table: &toml::Table) -> Option<PytestOptions> {
    let options = table
        .get("tool")?
        .get("pytest")?
        .get("ini_options")?
        .as_table()?;
    let words = |key: &str| -> Vec<String> {
        match options.get(key) {
            Some(toml::Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    };
    Some(PytestOptions {
        testpaths: words("testpaths"),
        python_files: words("python_files"),
    })
}

type IniSections = FxHashMap<String, FxHashMap<String, String>>;

/// Minimal INI reader: `[section]`, `key = value` / `key: value`, indented
/// continuation lines, `#`/`;` comments.
fn parse_ini(content: &str) -> Result<IniSections, String> {
    let mut sections = IniSections::default();
    let mut section: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[') {
            let name = name
                .strip_suffix(']')
                .ok_or_else(|| format!("line {}: unterminated section header", idx + 1))?;
            section = Some(name.trim().to_string());
            sections.entry(name.trim().to_string()).or_default();
            last_key = None;
            continue;
        }
        let Some(current) = section.as_ref() else {
            return Err(format!("line {}: entry outside of any section", idx + 1));
        };
        let values = sections.entry(current.clone()).or_default();

        if raw.starts_with([' ', '\t']) {
            if let Some(value) = last_key.as_ref().and_then(|k| values.get_mut(k)) {
                value.push(' ');
                value.push_str(line);
                continue;
            }
        }
        let Some(split) = line.find(['=', ':']) else {
            return Err(format!("line {}: expected `key = value`", idx + 1));
        };
        let key = line[..split].trim().to_string();
        values.insert(key.clone(), line[split + 1..].trim().to_string());
        last_key = Some(key);
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn ini_continuations() {
        let sections = parse_ini("[pytest]\ntestpaths =\n    tests\n    integration\naddopts = -q\n").unwrap();
        assert_eq!(sections["pytest"]["testpaths"].split_whitespace().count(), 2);
        assert_eq!(sections["pytest"]["addopts"], "-q");
    }

    #[test]
    fn ini_syntax_errors() {
        assert!(parse_ini("testpaths = tests\n").is_err());
        assert!(parse_ini("[pytest\n").is_err());
        assert!(parse_ini("[pytest]\njust words\n").is_err());
    }

    #[test]
    fn testpaths_become_projects() {
        let scope = PytestConfigParser
            .parse(Path::new("/repo/pytest.ini"), "[pytest]\ntestpaths = tests\n")
            .unwrap();
        assert_eq!(scope.projects()[0].base_dir, PathBuf::from("/repo/tests"));
        assert!(scope.contains(Path::new("/repo/tests/test_a.py")));
        assert!(!scope.contains(Path::new("/repo/src/test_a.py")));
    }

    #[test]
    fn pyproject_ini_options() {
        let scope = PytestConfigParser
            .parse(
                Path::new("/repo/pyproject.toml"),
                "[project]\nname = \"x\"\n\n[tool.pytest.ini_options]\ntestpaths = [\"tests\", \"integration\"]\npython_files = \"check_*.py\"\n",
            )
            .unwrap();
        assert_eq!(scope.projects().len(), 2);
        assert_eq!(scope.include(), &["check_*.py".to_string()]);
        assert!(scope.contains(Path::new("/repo/integration/check_api.py")));
        assert!(!scope.contains(Path::new("/repo/src/check_api.py")));
    }

    #[test]
    fn pyproject_without_pytest_table_is_not_a_config() {
        let err = PytestConfigParser
            .parse(Path::new("/repo/pyproject.toml"), "[tool.black]\nline-length = 88\n")
            .unwrap_err();
        assert!(err.is_not_applicable());
    }

    #[test]
    fn pyproject_syntax_errors_surface() {
        let err = PytestConfigParser
            .parse(Path::new("/repo/pyproject.toml"), "[tool.pytest.ini_options\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { .. }));
    }

    #[test]
    fn setup_cfg_and_tox_sections() {
        let scope = PytestConfigParser
            .parse(
                Path::new("/repo/setup.cfg"),
                "[metadata]\nname = x\n\n[tool:pytest]\ntestpaths = tests\n",
            )
            .unwrap();
        assert_eq!(scope.projects()[0].base_dir, PathBuf::from("/repo/tests"));

        let scope = PytestConfigParser
            .parse(Path::new("/repo/tox.ini"), "[tox]\nenvlist = py312\n\n[pytest]\ntestpaths = t\n")
            .unwrap();
        assert_eq!(scope.projects()[0].base_dir, PathBuf::from("/repo/t"));

        // setup.cfg only counts through its own section name.
        let err = PytestConfigParser
            .parse(Path::new("/repo/setup.cfg"), "[pytest]\ntestpaths = tests\n")
            .unwrap_err();
        assert!(err.is_not_applicable());
        let err = PytestConfigParser
            .parse(Path::new("/repo/tox.ini"), "[tox]\nenvlist = py312\n")
            .unwrap_err();
        assert!(err.is_not_applicable());
    }

    #[test]
    fn bare_pytest_ini_claims_its_directory() {
        let scope = PytestConfigParser
            .parse(Path::new("/repo/pytest.ini"), "# empty\n")
            .unwrap();
        assert_eq!(scope.base_dir(), Path::new("/repo"));
        assert!(scope.projects().is_empty());
    }

    #[test]
    fn conftest_claims_its_directory() {
        let scope = PytestConfigParser
            .parse(Path::new("/repo/pkg/conftest.py"), "import pytest\n")
            .unwrap();
        assert_eq!(scope.base_dir(), Path::new("/repo/pkg"));
    }
}
