//! Grammar selection and parsed-tree ownership.

use std::fmt;
use std::path::Path;

use crate::scanner::language_detect::Language;

/// A concrete tree-sitter grammar. TypeScript has two dialects, so this is
/// finer-grained than [`Language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grammar {
    TypeScript,
    Tsx,
    JavaScript,
    Python,
    Go,
    Java,
    Php,
}

impl Grammar {
    pub const ALL: [Grammar; 7] = [
        Grammar::TypeScript,
        Grammar::Tsx,
        Grammar::JavaScript,
        Grammar::Python,
        Grammar::Go,
        Grammar::Java,
        Grammar::Php,
    ];

    /// Default grammar for a language.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::TypeScript => Self::TypeScript,
            Language::JavaScript => Self::JavaScript,
            Language::Python => Self::Python,
            Language::Go => Self::Go,
            Language::Java => Self::Java,
            Language::Php => Self::Php,
        }
    }

    /// Grammar for a file, picking the TSX dialect for `.tsx` files.
    pub fn for_path(path: &Path) -> Option<Self> {
        let language = Language::from_path(path)?;
        let is_tsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
        if is_tsx {
            return Some(Self::Tsx);
        }
        Some(Self::for_language(language))
    }

    pub fn language(&self) -> Language {
        match self {
            Self::TypeScript | Self::Tsx => Language::TypeScript,
            Self::JavaScript => Language::JavaScript,
            Self::Python => Language::Python,
            Self::Go => Language::Go,
            Self::Java => Language::Java,
            Self::Php => Language::Php,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::Php => "php",
        }
    }

    pub fn ts_language(&self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A syntax tree plus the grammar that produced it.
///
/// The native tree is released when this value is dropped.
#[derive(Debug)]
pub struct ParsedTree {
    tree: tree_sitter::Tree,
    grammar: Grammar,
}

impl ParsedTree {
    pub(crate) fn new(tree: tree_sitter::Tree, grammar: Grammar) -> Self {
        Self { tree, grammar }
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}
