//! Parser pool reuse after halted parses, and query cache concurrency.

use std::sync::{Arc, Barrier};
use std::thread;

use testlens_analysis::parsers::{Grammar, ParserManager, QueryCache};
use testlens_analysis::ScanCancellation;
use tree_sitter::{ParseOptions, ParseState, Point, QueryCursor, StreamingIterator};

const SMALL: &str = "describe('a', () => { it('b', () => {}) })\n";
const CALLS: &str = "(call_expression function: (identifier) @fn)";

fn large_source() -> String {
    (0..5_000)
        .map(|i| format!("const value{i} = compute({i}, 'text', [1, 2, 3]);\n"))
        .collect()
}

#[test]
fn halted_parse_does_not_leak_into_next_checkout() {
    let manager = ParserManager::new();
    let big = large_source();
    {
        let mut parser = manager.pool().checkout(Grammar::TypeScript).unwrap();
        let bytes = big.as_bytes();
        let len = bytes.len();
        let mut read = |offset: usize, _: Point| &bytes[offset.min(len)..];
        let mut halt = |_: &ParseState| true;
        let options = ParseOptions::new().progress_callback(&mut halt);
        let tree = parser.parse_with_options(&mut read, None, Some(options));
        assert!(tree.is_none(), "parse should have been halted");
    }
    assert_eq!(manager.pool().created_count(), 1);
    assert_eq!(manager.pool().idle_count(Grammar::TypeScript), 1);

    // Same pooled parser, fresh document.
    let reused = manager
        .parse(Grammar::TypeScript, SMALL.as_bytes(), &ScanCancellation::new())
        .unwrap();
    assert_eq!(manager.pool().created_count(), 1);
    assert!(!reused.has_errors());

    let fresh = ParserManager::new()
        .parse(Grammar::TypeScript, SMALL.as_bytes(), &ScanCancellation::new())
        .unwrap();
    assert_eq!(reused.root_node().to_sexp(), fresh.root_node().to_sexp());
}

#[test]
fn cancelled_token_stops_parsing_until_reset() {
    let manager = ParserManager::new();
    let cancel = ScanCancellation::new();
    let big = large_source();

    cancel.clone().cancel();
    let err = manager.parse(Grammar::JavaScript, big.as_bytes(), &cancel).unwrap_err();
    assert!(matches!(
        err,
        testlens_core::errors::ParseError::Interrupted(testlens_core::errors::Interruption::Cancelled)
    ));

    cancel.reset();
    let tree = manager.parse(Grammar::JavaScript, big.as_bytes(), &cancel).unwrap();
    assert!(!tree.has_errors());
    assert_eq!(tree.root_node().named_child_count(), 5_000);
}

#[test]
fn concurrent_first_requests_compile_once() {
    const THREADS: usize = 16;
    let cache = Arc::new(QueryCache::default());
    let barrier = Arc::new(Barrier::new(THREADS));

    let queries: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_compile(Grammar::TypeScript, CALLS).unwrap()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(cache.compilations(), 1);
    assert!(queries.iter().all(|q| Arc::ptr_eq(q, &queries[0])));
}

#[test]
fn clear_keeps_in_flight_queries_alive() {
    let manager = ParserManager::new();
    let held = manager.query(Grammar::TypeScript, CALLS).unwrap();
    manager.queries().clear();
    assert!(manager.queries().get(Grammar::TypeScript, CALLS).is_none());

    let tree = manager
        .parse(Grammar::TypeScript, SMALL.as_bytes(), &ScanCancellation::new())
        .unwrap();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&held, tree.root_node(), SMALL.as_bytes());
    let mut count = 0;
    while matches.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 2);

    let recompiled = manager.query(Grammar::TypeScript, CALLS).unwrap();
    assert!(!Arc::ptr_eq(&held, &recompiled));
    assert_eq!(manager.queries().compilations(), 2);
}
