//! Test file naming conventions per language.
//!
//! Paths are judged relative to the scan root so directory names above the
//! root never make a file look like a test.

use std::path::{Component, Path};

use super::language_detect::Language;

const JS_TEST_DIRS: &[&str] = &["__tests__", "test", "tests", "spec", "e2e"];
const JS_TEST_INFIXES: &[&str] = &[".test.", ".spec.", ".e2e.", ".e2e-spec.", ".cy."];

/// Whether `relative` looks like a test file for `language`.
pub fn is_test_file(relative: &Path, language: Language) -> bool {
    let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let stem = name.split('.').next().unwrap_or(name);
    match language {
        Language::JavaScript | Language::TypeScript => {
            if name.ends_with(".d.ts") {
                return false;
            }
            JS_TEST_INFIXES.iter().any(|i| name.contains(i)) || in_dir(relative, JS_TEST_DIRS)
        }
        Language::Python => {
            (name.starts_with("test_") || stem.ends_with("_test")) && name.ends_with(".py")
        }
        Language::Go => name.ends_with("_test.go"),
        Language::Java => {
            ["Test", "Tests", "IT", "TestCase"].iter().any(|s| stem.ends_with(s))
                || stem.starts_with("Test")
                || relative_contains(relative, &["src", "test", "java"])
        }
        Language::Php => stem.ends_with("Test"),
    }
}

fn dirs(relative: &Path) -> impl Iterator<Item = &str> {
    let parent = relative.parent().unwrap_or(Path::new(""));
    parent.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    })
}

fn in_dir(relative: &Path, names: &[&str]) -> bool {
    dirs(relative).any(|d| names.contains(&d))
}

fn relative_contains(relative: &Path, sequence: &[&str]) -> bool {
    let parts: Vec<&str> = dirs(relative).collect();
    parts.windows(sequence.len()).any(|w| w == sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(path: &str) -> bool {
        let p = Path::new(path);
        is_test_file(p, Language::from_path(p).unwrap())
    }

    #[test]
    fn javascript() {
        assert!(check("src/user.test.ts"));
        assert!(check("src/user.spec.jsx"));
        assert!(check("apps/web/__tests__/user.ts"));
        assert!(!check("src/user.ts"));
        assert!(!check("types/__tests__/globals.d.ts"));
    }

    #[test]
    fn python_go_java_php() {
        assert!(check("tests/test_user.py"));
        assert!(check("pkg/user_test.py"));
        assert!(!check("pkg/user.py"));
        assert!(check("pkg/user_test.go"));
        assert!(!check("pkg/user.go"));
        assert!(check("src/main/java/UserTest.java"));
        assert!(check("src/test/java/com/x/UserSpecification.java"));
        assert!(!check("src/main/java/User.java"));
        assert!(check("tests/Unit/UserTest.php"));
        assert!(!check("src/User.php"));
    }
}
