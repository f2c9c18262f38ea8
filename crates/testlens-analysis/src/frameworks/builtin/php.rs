//! PHPUnit.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use testlens_core::errors::ConfigError;

use crate::frameworks::definition::FrameworkDefinition;
use crate::frameworks::extractors::PhpUnitExtractor;
use crate::frameworks::matcher::{ContentMatcher, FilenameMatcher, ImportMatcher};
use crate::frameworks::traits::ConfigParser;
use crate::scanner::language_detect::Language;
use crate::scope::globs::resolve_against;
use crate::scope::{ConfigScope, SubProject};

pub fn definitions() -> Vec<FrameworkDefinition> {
    vec![FrameworkDefinition::builder("phpunit")
        .languages(&[Language::Php])
        .matcher(ImportMatcher::new(["PHPUnit"]))
        .matcher(ContentMatcher::new([
            r"\bextends\s+(\\?PHPUnit\\Framework\\)?TestCase\b",
            r"\$this->(assert[A-Z]\w*|expectException)\(",
        ]))
        .matcher(FilenameMatcher::new(["*Test.php"]))
        .config_files(&["phpunit.xml", "phpunit.xml.dist", "phpunit.dist.xml"])
        .config_parser(PhpUnitConfigParser)
        .parser(PhpUnitExtractor)
        .priority(10)
        .build()]
}

/// `phpunit.xml`: every `<testsuite>` `<directory>` becomes a sub-project
/// (honouring its `suffix`), `<exclude>` entries are excluded.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpUnitConfigParser;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Directory,
    Exclude,
    Other,
}

impl ConfigParser for PhpUnitConfigParser {
    fn parse(&self, config_path: &Path, content: &str) -> Result<ConfigScope, ConfigError> {
        let syntax = |message: String| ConfigError::Syntax {
            path: config_path.to_path_buf(),
            message,
        };
        let scope = ConfigScope::at_config_dir(config_path, "phpunit");
        let base = scope.base_dir().to_path_buf();

        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut projects = Vec::new();
        let mut exclude = Vec::new();
        let mut current = Element::Other;
        let mut suffix: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    current = element(&e);
                    if current == Element::Directory {
                        suffix = attribute(&e, "suffix").map_err(&syntax)?;
                    }
                }
                Ok(Event::Text(text)) => {
                    let value = text.unescape().map_err(|e| syntax(e.to_string()))?;
                    let value = value.trim();
                    if value.is_empty() {
                        continue;
                    }
                    match current {
                        Element::Directory => {
                            let include = suffix.iter().map(|s| format!("**/*{s}")).collect();
                            projects.push(SubProject::new(resolve_against(&base, value)).with_include(include));
                        }
                        Element::Exclude => {
                            let excluded = resolve_against(&base, value.trim_end_matches('/'));
                            let excluded = excluded.to_string_lossy();
                            exclude.push(format!("{excluded}/**"));
                            exclude.push(excluded.into_owned());
                        }
                        Element::Other => {}
                    }
                }
                Ok(Event::End(_)) => current = Element::Other,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(syntax(e.to_string())),
            }
        }

        Ok(scope.with_exclude(exclude).with_projects(projects))
    }
}

fn element(e: &BytesStart<'_>) -> Element {
    match e.name().as_ref() {
        b"directory" => Element::Directory,
        b"exclude" => Element::Exclude,
        _ => Element::Other,
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    match e.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|err| err.to_string()),
        Ok(None) => Ok(None),
        Err(err) => Err(err.to_string()),
    }
}
