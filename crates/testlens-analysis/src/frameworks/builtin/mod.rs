//! Built-in framework definitions.
//!
//! - `javascript.rs` — jest, vitest, playwright, mocha
//! - `python.rs` — pytest
//! - `go.rs` — go-testing
//! - `java.rs` — junit4, junit5
//! - `php.rs` — phpunit
//! - `js_config.rs` — shared config readers

pub mod go;
pub mod java;
pub mod javascript;
pub mod js_config;
pub mod php;
pub mod python;

use std::path::{Path, PathBuf};

use super::registry::FrameworkRegistry;
use crate::scope::globs::resolve_against;

/// Register every built-in framework into `registry`.
pub fn register_builtins(registry: &mut FrameworkRegistry) {
    for def in javascript::definitions()
        .into_iter()
        .chain(python::definitions())
        .chain(go::definitions())
        .chain(java::definitions())
        .chain(php::definitions())
    {
        registry.register(def);
    }
}

/// Resolve project entries (directories, globs over directories, or paths to
/// nested config files) against `dir`. Globs are expanded on disk.
pub(crate) fn expand_project_dirs(dir: &Path, entries: &[String]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for entry in entries {
        let resolved = resolve_against(dir, entry);
        if entry.contains(['*', '?', '[']) {
            let pattern = resolved.to_string_lossy().into_owned();
            match glob::glob(&pattern) {
                Ok(paths) => dirs.extend(paths.flatten().filter_map(|p| project_dir(&p))),
                Err(e) => tracing::warn!(pattern = %pattern, error = %e, "invalid project glob"),
            }
        } else if let Some(d) = project_dir(&resolved) {
            dirs.push(d);
        }
    }
    dirs.sort();
    dirs.dedup();
    dirs
}

/// A directory entry stands for itself; a file entry (a nested config)
/// stands for its parent. Entries that do not exist are kept as written.
fn project_dir(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        path.parent().map(Path::to_path_buf)
    } else if path.exists() || path.extension().is_none() {
        Some(path.to_path_buf())
    } else {
        None
    }
}
