//! ParserManager — builds syntax trees and runs cached queries over them.

use std::cell::Cell;
use std::path::Path;
use std::sync::Arc;

use testlens_core::errors::{Interruption, ParseError};
use tree_sitter::{Node, ParseOptions, ParseState, Point, Query, QueryCursor, StreamingIterator};

use super::pool::ParserPool;
use super::query_cache::QueryCache;
use super::types::{Grammar, ParsedTree};
use crate::scanner::cancellation::ScanCancellation;

/// One named capture from a query match.
#[derive(Debug, Clone)]
pub struct Capture<'tree> {
    pub name: String,
    pub node: Node<'tree>,
}

impl<'tree> Capture<'tree> {
    /// The captured node's source text (lossy UTF-8).
    pub fn text<'s>(&self, source: &'s [u8]) -> &'s str {
        self.node.utf8_text(source).unwrap_or("")
    }
}

/// Owns the parser pool and query cache shared by a whole scan.
pub struct ParserManager {
    pool: ParserPool,
    queries: QueryCache,
}

impl ParserManager {
    pub fn new() -> Self {
        Self {
            pool: ParserPool::new(),
            queries: QueryCache::default(),
        }
    }

    /// Create a manager from explicit pool and cache instances.
    pub fn with_parts(pool: ParserPool, queries: QueryCache) -> Self {
        Self { pool, queries }
    }

    pub fn pool(&self) -> &ParserPool {
        &self.pool
    }

    pub fn queries(&self) -> &QueryCache {
        &self.queries
    }

    /// Parse `source` with the grammar implied by `path`'s extension.
    pub fn parse_path(
        &self,
        path: &Path,
        source: &[u8],
        cancellation: &ScanCancellation,
    ) -> Result<ParsedTree, ParseError> {
        let grammar = Grammar::for_path(path).ok_or_else(|| ParseError::UnsupportedLanguage {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;
        self.parse(grammar, source, cancellation)
            .map_err(|e| match e {
                ParseError::TreeSitterFailed { message, .. } => ParseError::TreeSitterFailed {
                    path: path.to_path_buf(),
                    message,
                },
                other => other,
            })
    }

    /// Parse `source` with `grammar`, halting if `cancellation` fires mid-parse.
    pub fn parse(
        &self,
        grammar: Grammar,
        source: &[u8],
        cancellation: &ScanCancellation,
    ) -> Result<ParsedTree, ParseError> {
        cancellation.check()?;

        let mut parser = self.pool.checkout(grammar)?;
        let halted: Cell<Option<Interruption>> = Cell::new(None);
        let mut progress = |_state: &ParseState| -> bool {
            match cancellation.interruption() {
                Some(reason) => {
                    halted.set(Some(reason));
                    true
                }
                None => false,
            }
        };
        let options = ParseOptions::new().progress_callback(&mut progress);

        let len = source.len();
        let mut read = |offset: usize, _position: Point| &source[offset.min(len)..];
        let tree = parser.parse_with_options(&mut read, None, Some(options));

        match (tree, halted.get()) {
            (Some(tree), _) => Ok(ParsedTree::new(tree, grammar)),
            (None, Some(reason)) => Err(ParseError::Interrupted(reason)),
            (None, None) => Err(ParseError::TreeSitterFailed {
                path: Default::default(),
                message: "tree-sitter returned None".to_string(),
            }),
        }
    }

    /// Compiled query for `(grammar, source)`, shared through the cache.
    pub fn query(&self, grammar: Grammar, source: &str) -> Result<Arc<Query>, ParseError> {
        self.queries.get_or_compile(grammar, source)
    }

    /// Run a cached query over `tree`, returning every match's captures in
    /// document order.
    pub fn run_query<'tree>(
        &self,
        tree: &'tree ParsedTree,
        query_source: &str,
        source: &[u8],
    ) -> Result<Vec<Vec<Capture<'tree>>>, ParseError> {
        let query = self.query(tree.grammar(), query_source)?;
        let names = query.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source);
        let mut out = Vec::new();
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|c| Capture {
                    name: names[c.index as usize].to_string(),
                    node: c.node,
                })
                .collect();
            out.push(captures);
        }
        Ok(out)
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_selects_tsx_dialect() {
        let manager = ParserManager::new();
        let source = b"const el = <div>{x}</div>;";
        let tree = manager
            .parse_path(Path::new("a.test.tsx"), source, &ScanCancellation::new())
            .unwrap();
        assert_eq!(tree.grammar(), Grammar::Tsx);
        assert!(!tree.has_errors());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let manager = ParserManager::new();
        let err = manager
            .parse_path(Path::new("a.rb"), b"puts 1", &ScanCancellation::new())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn cancelled_before_start_does_not_touch_the_pool() {
        let manager = ParserManager::new();
        let cancel = ScanCancellation::new();
        cancel.cancel();
        let err = manager.parse(Grammar::Go, b"package x", &cancel).unwrap_err();
        assert!(matches!(err, ParseError::Interrupted(Interruption::Cancelled)));
        assert_eq!(manager.pool().created_count(), 0);
    }

    #[test]
    fn run_query_returns_named_captures() {
        let manager = ParserManager::new();
        let source = b"package x\nfunc TestA(t *testing.T) {}\nfunc helper() {}\n";
        let tree = manager.parse(Grammar::Go, source, &ScanCancellation::new()).unwrap();
        let matches = manager
            .run_query(&tree, "(function_declaration name: (identifier) @name)", source)
            .unwrap();
        let names: Vec<&str> = matches.iter().map(|m| m[0].text(source)).collect();
        assert_eq!(names, vec!["TestA", "helper"]);
        assert_eq!(matches[0][0].name, "name");
    }
}
