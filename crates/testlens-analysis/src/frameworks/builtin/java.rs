//! JUnit 4 and JUnit 5 (Jupiter). Each rules the other out on imports.

use crate::frameworks::definition::FrameworkDefinition;
use crate::frameworks::extractors::JUnitExtractor;
use crate::frameworks::matcher::{ContentMatcher, FilenameMatcher, ImportMatcher};
use crate::scanner::language_detect::Language;

const TEST_CLASS_NAMES: [&str; 4] = ["*Test.java", "*Tests.java", "Test*.java", "*IT.java"];

pub fn definitions() -> Vec<FrameworkDefinition> {
    vec![
        FrameworkDefinition::builder("junit4")
            .languages(&[Language::Java])
            .matcher(
                ImportMatcher::new(["org.junit", "junit.framework"])
                    .with_conflicts(["org.junit.jupiter", "org.junit.platform"]),
            )
            .matcher(
                ContentMatcher::new([r"@RunWith\(", r"@(BeforeClass|AfterClass)\b", r"\bextends\s+TestCase\b"])
                    .with_conflicts([r"@(BeforeEach|AfterEach|BeforeAll|AfterAll|Disabled|Nested)\b"]),
            )
            .matcher(FilenameMatcher::new(TEST_CLASS_NAMES))
            .parser(JUnitExtractor)
            .build(),
        FrameworkDefinition::builder("junit5")
            .languages(&[Language::Java])
            .matcher(ImportMatcher::new(["org.junit.jupiter", "org.junit.platform"]).with_conflicts([
                "org.junit.Test",
                "org.junit.Assert",
                "org.junit.Before",
                "org.junit.After",
                "org.junit.BeforeClass",
                "org.junit.AfterClass",
                "org.junit.Ignore",
                "org.junit.Rule",
                "org.junit.runner",
                "junit.framework",
            ]))
            .matcher(
                ContentMatcher::new([r"@(BeforeEach|AfterEach|BeforeAll|AfterAll)\b", r"@(Disabled|DisplayName|Nested|ParameterizedTest)\b"])
                    .with_conflicts([r"@RunWith\("]),
            )
            .matcher(FilenameMatcher::new(TEST_CLASS_NAMES))
            .parser(JUnitExtractor)
            .priority(5)
            .build(),
    ]
}
