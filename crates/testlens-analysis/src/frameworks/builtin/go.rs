//! Go's built-in `testing` package.

use crate::frameworks::definition::FrameworkDefinition;
use crate::frameworks::extractors::GoTestExtractor;
use crate::frameworks::matcher::{ContentMatcher, FilenameMatcher, ImportMatcher};
use crate::scanner::language_detect::Language;

pub fn definitions() -> Vec<FrameworkDefinition> {
    vec![FrameworkDefinition::builder("go-testing")
        .languages(&[Language::Go])
        .matcher(FilenameMatcher::new(["*_test.go"]))
        .matcher(ImportMatcher::new(["testing"]))
        .matcher(ContentMatcher::new([r"func\s+Test\w*\s*\(\s*\w+\s+\*testing\.T\s*\)"]))
        .parser(GoTestExtractor)
        .filename_only()
        .priority(10)
        .build()]
}
