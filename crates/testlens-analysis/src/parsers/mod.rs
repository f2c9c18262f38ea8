//! Parser resource layer: pooled tree-sitter parsers and a compiled-query cache.
//!
//! - `types.rs` — `Grammar` (per-dialect tree-sitter language) and `ParsedTree`
//! - `pool.rs` — per-grammar parser pools, reset before every reuse
//! - `query_cache.rs` — single-flight `(grammar, query text)` → `Arc<Query>` cache
//! - `manager.rs` — `ParserManager`, the facade the rest of the engine uses

pub mod manager;
pub mod pool;
pub mod query_cache;
pub mod types;

pub use manager::{Capture, ParserManager};
pub use pool::{ParserPool, PooledParser};
pub use query_cache::QueryCache;
pub use types::{Grammar, ParsedTree};
