//! Per-grammar tree-sitter parser pools.
//!
//! A parse halted by its progress callback leaves the parser holding resumable
//! state: the next `parse` call would continue the old document instead of
//! starting the new one. Every parser is therefore `reset()` when its guard is
//! dropped, before it becomes visible to the next checkout.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use testlens_core::errors::ParseError;
use testlens_core::FxHashMap;
use tree_sitter::Parser;

use super::types::Grammar;

/// Default number of idle parsers retained per grammar.
const DEFAULT_MAX_IDLE: usize = 64;

/// Reusable parsers keyed by grammar.
pub struct ParserPool {
    idle: FxHashMap<Grammar, Mutex<Vec<Parser>>>,
    max_idle: usize,
    created: AtomicUsize,
}

impl ParserPool {
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create a pool that keeps at most `max_idle` parsers per grammar.
    pub fn with_max_idle(max_idle: usize) -> Self {
        let idle = Grammar::ALL
            .iter()
            .map(|g| (*g, Mutex::new(Vec::new())))
            .collect();
        Self {
            idle,
            max_idle,
            created: AtomicUsize::new(0),
        }
    }

    /// Take a parser for `grammar`, reusing an idle one when available.
    pub fn checkout(&self, grammar: Grammar) -> Result<PooledParser<'_>, ParseError> {
        let reused = self.slot(grammar).and_then(|slot| {
            let mut idle = slot.lock().unwrap_or_else(|e| e.into_inner());
            idle.pop()
        });

        let parser = match reused {
            Some(parser) => parser,
            None => self.create(grammar)?,
        };

        Ok(PooledParser {
            parser: Some(parser),
            grammar,
            pool: self,
        })
    }

    /// Number of idle parsers currently pooled for `grammar`.
    pub fn idle_count(&self, grammar: Grammar) -> usize {
        self.slot(grammar)
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    /// Total parsers allocated over the pool's lifetime.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    fn slot(&self, grammar: Grammar) -> Option<&Mutex<Vec<Parser>>> {
        self.idle.get(&grammar)
    }

    fn create(&self, grammar: Grammar) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.ts_language())
            .map_err(|_| ParseError::GrammarUnavailable {
                language: grammar.name().to_string(),
            })?;
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(grammar = %grammar, "allocated parser");
        Ok(parser)
    }

    fn give_back(&self, grammar: Grammar, mut parser: Parser) {
        parser.reset();
        if let Some(slot) = self.slot(grammar) {
            let mut idle = slot.lock().unwrap_or_else(|e| e.into_inner());
            if idle.len() < self.max_idle {
                idle.push(parser);
            }
        }
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A checked-out parser; returns to its pool (after a reset) on drop.
pub struct PooledParser<'a> {
    parser: Option<Parser>,
    grammar: Grammar,
    pool: &'a ParserPool,
}

impl PooledParser<'_> {
    pub fn grammar(&self) -> Grammar {
        self.grammar
    }
}

impl Deref for PooledParser<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        self.parser.as_ref().expect("parser present until drop")
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        self.parser.as_mut().expect("parser present until drop")
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        if let Some(parser) = self.parser.take() {
            self.pool.give_back(self.grammar, parser);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_reuses_returned_parser() {
        let pool = ParserPool::with_max_idle(4);
        {
            let _p = pool.checkout(Grammar::Go).unwrap();
        }
        assert_eq!(pool.idle_count(Grammar::Go), 1);
        {
            let _p = pool.checkout(Grammar::Go).unwrap();
            assert_eq!(pool.idle_count(Grammar::Go), 0);
        }
        assert_eq!(pool.created_count(), 1);
    }

    #[test]
    fn idle_list_is_bounded() {
        let pool = ParserPool::with_max_idle(1);
        let a = pool.checkout(Grammar::Python).unwrap();
        let b = pool.checkout(Grammar::Python).unwrap();
        drop(a);
        drop(b);
        assert_eq!(pool.idle_count(Grammar::Python), 1);
        assert_eq!(pool.created_count(), 2);
    }

    #[test]
    fn pools_are_per_grammar() {
        let pool = ParserPool::new();
        drop(pool.checkout(Grammar::Java).unwrap());
        assert_eq!(pool.idle_count(Grammar::Java), 1);
        assert_eq!(pool.idle_count(Grammar::Php), 0);
    }
}
