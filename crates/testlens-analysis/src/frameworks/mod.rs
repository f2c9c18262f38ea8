//! Framework registry and plugin contracts.
//!
//! - `types.rs` — signals, match results, and the structural test inventory types
//! - `traits.rs` — `Matcher`, `ConfigParser`, `StructuralParser`
//! - `matcher.rs` — import / content / filename / config-file matchers
//! - `definition.rs` — `FrameworkDefinition` and its builder
//! - `registry.rs` — `FrameworkRegistry`, an explicit value shared by `Arc`
//! - `builtin/` — built-in framework definitions and their config parsers
//! - `extractors/` — tree-sitter based structural parsers

pub mod builtin;
pub mod definition;
pub mod extractors;
pub mod matcher;
pub mod registry;
pub mod traits;
pub mod types;

pub use definition::{FrameworkBuilder, FrameworkDefinition};
pub use matcher::{ConfigFileMatcher, ContentMatcher, FilenameMatcher, ImportMatcher};
pub use registry::FrameworkRegistry;
pub use traits::{ConfigParser, Matcher, ParseContext, StructuralParser};
pub use types::{Inventory, MatchResult, Signal, SignalKind, TestCase, TestFile, TestStatus, TestSuite};
