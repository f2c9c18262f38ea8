//! Compiled tree-sitter query cache.
//!
//! Keyed by `(grammar, query text)`. Moka's `try_get_with` coalesces
//! concurrent first requests for the same key, so each distinct query is
//! compiled at most once no matter how many threads ask for it at the same time.
//!
//! The default cache never evicts: the extractors use a small fixed query
//! set, so "at most once" holds for the life of the cache. A cache built with
//! [`QueryCache::with_capacity`] may evict, and an evicted query is compiled
//! again on its next use.
//!
//! Entries are handed out as `Arc<Query>`: `clear()` only drops the cache's own
//! reference, and a query stays alive until its last in-flight holder releases it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use testlens_core::errors::ParseError;
use tree_sitter::Query;

use super::types::Grammar;

type CacheKey = (Grammar, String);

/// Single-flight cache of compiled queries.
pub struct QueryCache {
    inner: Cache<CacheKey, Arc<Query>>,
    compilations: AtomicUsize,
}

impl QueryCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::from_cache(Cache::builder().build())
    }

    /// A cache holding up to `capacity` compiled queries. Evicted queries are
    /// recompiled on demand.
    pub fn with_capacity(capacity: u64) -> Self {
        Self::from_cache(Cache::new(capacity))
    }

    fn from_cache(inner: Cache<CacheKey, Arc<Query>>) -> Self {
        Self {
            inner,
            compilations: AtomicUsize::new(0),
        }
    }

    /// Return the compiled query for `(grammar, source)`, compiling it on first use.
    pub fn get_or_compile(&self, grammar: Grammar, source: &str) -> Result<Arc<Query>, ParseError> {
        let key = (grammar, source.to_string());
        self.inner
            .try_get_with(key, || {
                self.compilations.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(grammar = %grammar, "compiling query");
                Query::new(&grammar.ts_language(), source)
                    .map(Arc::new)
                    .map_err(|e| ParseError::Query {
                        language: grammar.name().to_string(),
                        message: e.to_string(),
                    })
            })
            .map_err(|e| (*e).clone())
    }

    /// Look up an already-compiled query without compiling.
    pub fn get(&self, grammar: Grammar, source: &str) -> Option<Arc<Query>> {
        self.inner.get(&(grammar, source.to_string()))
    }

    /// Drop every cached query. Holders of an `Arc<Query>` keep theirs valid.
    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Number of compilations performed (including failed ones).
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of cached queries.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
