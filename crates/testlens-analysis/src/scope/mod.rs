//! Config scope resolution.
//!
//! - `config_scope.rs` — `ConfigScope`: what one framework config claims
//! - `globs.rs` — config-style glob expansion and matching
//! - `project_scope.rs` — `AggregatedProjectScope` and overlap precedence
//! - `resolver.rs` — cached nearest-config walk toward the project root
//! - `discovery.rs` — bulk config discovery for a scan

pub mod config_scope;
pub mod discovery;
pub mod globs;
pub mod project_scope;
pub mod resolver;

pub use config_scope::{ConfigScope, SubProject};
pub use discovery::{build_project_scope, discover_config_files, ConfigCandidate};
pub use project_scope::AggregatedProjectScope;
pub use resolver::ScopeResolver;
