//! Nearest-config resolution with a shared probe cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use glob::Pattern;
use testlens_core::constants::DEFAULT_MAX_SCOPE_DEPTH;
use testlens_core::FxHashMap;

use super::config_scope::ConfigScope;
use super::discovery::parse_config;
use crate::frameworks::FrameworkRegistry;
use crate::scanner::language_detect::Language;

/// Files whose presence marks a project root. The walk goes one directory
/// above the first root it sees and then stops.
pub const PROJECT_ROOT_MARKERS: &[&str] = &[
    ".git",
    "go.mod",
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "composer.json",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "setup.py",
];

type CacheKey = (PathBuf, String);

/// What one directory listing says about a pattern set.
#[derive(Debug, Clone)]
struct DirListing {
    /// Matching configs, in pattern order then name order.
    configs: Vec<PathBuf>,
    is_root: bool,
}

/// Finds the config governing a file by walking toward the project root.
///
/// Listings are cached per `(directory, sorted pattern set)`, so concurrent
/// workers resolving sibling files share one directory probe. Only the
/// directory's own facts are cached, never a walk's answer: where a walk
/// stops depends on the roots below the directory, which differ per file.
/// Parsed scopes are cached per config path.
pub struct ScopeResolver {
    max_depth: usize,
    nearest: RwLock<FxHashMap<CacheKey, DirListing>>,
    parsed: RwLock<FxHashMap<PathBuf, Option<Arc<ConfigScope>>>>,
    probes: AtomicUsize,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_SCOPE_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            nearest: RwLock::new(FxHashMap::default()),
            parsed: RwLock::new(FxHashMap::default()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Directory listings performed so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.nearest.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.parsed.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// The nearest config file at or above `file`'s directory whose base name
    /// matches one of `patterns`. Patterns are tried in sorted order and
    /// directory entries in name order, so the answer never depends on
    /// filesystem enumeration order.
    pub fn find_nearest_config(&self, file: &Path, patterns: &[String]) -> Option<PathBuf> {
        self.find_nearest_configs(file, patterns).into_iter().next()
    }

    /// Every matching config in the nearest directory that has one, in the
    /// same order [`ScopeResolver::find_nearest_config`] ranks them.
    pub fn find_nearest_configs(&self, file: &Path, patterns: &[String]) -> Vec<PathBuf> {
        let mut sorted: Vec<&str> = patterns.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        let key = sorted.join("\0");
        let compiled: Vec<Pattern> = sorted
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "ignoring malformed config pattern");
                    None
                }
            })
            .collect();

        let mut depth = 0;
        let mut past_root = false;
        let mut dir = file.parent();

        while let Some(current) = dir {
            if depth >= self.max_depth {
                break;
            }
            depth += 1;

            let listing = self.listing(current, &key, &compiled);
            if !listing.configs.is_empty() {
                return listing.configs;
            }
            if past_root {
                break;
            }
            past_root = listing.is_root;
            dir = current.parent();
        }
        Vec::new()
    }

    fn listing(&self, dir: &Path, key: &str, patterns: &[Pattern]) -> DirListing {
        let cache_key = (dir.to_path_buf(), key.to_string());
        if let Some(cached) = self
            .nearest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&cache_key)
        {
            return cached.clone();
        }
        let listing = self.probe(dir, patterns);
        self.nearest
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(cache_key, listing.clone());
        listing
    }

    /// List `dir` once: its config matches and whether it is a project root.
    fn probe(&self, dir: &Path, patterns: &[Pattern]) -> DirListing {
        self.probes.fetch_add(1, Ordering::Relaxed);
        let mut names: Vec<String> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "cannot list directory");
                return DirListing {
                    configs: Vec::new(),
                    is_root: false,
                };
            }
        };
        names.sort_unstable();

        let is_root = names.iter().any(|n| PROJECT_ROOT_MARKERS.contains(&n.as_str()));
        let mut configs: Vec<PathBuf> = Vec::new();
        for pattern in patterns {
            for name in names.iter().filter(|n| pattern.matches(n)) {
                let path = dir.join(name);
                if !configs.contains(&path) {
                    configs.push(path);
                }
            }
        }
        DirListing { configs, is_root }
    }

    /// Scopes of every framework for `language` whose config governs `file`.
    /// Within the nearest directory, the first config that yields a scope
    /// wins; configs that fail to parse or carry no settings for the framework
    /// are logged and skipped.
    pub fn resolve_scopes(
        &self,
        file: &Path,
        language: Language,
        registry: &FrameworkRegistry,
    ) -> Vec<Arc<ConfigScope>> {
        let mut scopes = Vec::new();
        for def in registry.for_language(language).filter(|d| d.has_config()) {
            let found = self
                .find_nearest_configs(file, &def.config_patterns)
                .into_iter()
                .find_map(|config_path| self.load_scope(&config_path, &def.name, registry));
            if let Some(scope) = found {
                scopes.push(scope);
            }
        }
        scopes
    }

    fn load_scope(
        &self,
        config_path: &Path,
        framework: &str,
        registry: &FrameworkRegistry,
    ) -> Option<Arc<ConfigScope>> {
        if let Some(cached) = self
            .parsed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(config_path)
        {
            return cached.clone();
        }
        let def = registry.get(framework)?;
        let scope = match parse_config(def, config_path) {
            Ok(scope) => Some(Arc::new(scope)),
            Err(e) if e.is_not_applicable() => {
                tracing::debug!(config = %config_path.display(), framework, "no framework settings");
                None
            }
            Err(e) => {
                tracing::warn!(config = %config_path.display(), error = %e, "config parse failed");
                None
            }
        };
        self.parsed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(config_path.to_path_buf(), scope.clone());
        scope
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn patterns() -> Vec<String> {
        vec!["jest.config.*".into()]
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("jest.config.js"), "module.exports = {}").unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();

        let resolver = ScopeResolver::new();
        let found = resolver.find_nearest_config(&dir.path().join("src/deep/a.test.js"), &patterns());
        assert_eq!(found, Some(dir.path().join("jest.config.js")));
    }

    #[test]
    fn repeated_lookup_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jest.config.js"), "").unwrap();
        let resolver = ScopeResolver::new();
        let file = dir.path().join("a.test.js");

        resolver.find_nearest_config(&file, &patterns());
        assert_eq!(resolver.probe_count(), 1);
        resolver.find_nearest_config(&file, &patterns());
        assert_eq!(resolver.probe_count(), 1);
    }

    #[test]
    fn pattern_order_does_not_split_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vitest.config.ts"), "").unwrap();
        let resolver = ScopeResolver::new();
        let file = dir.path().join("a.test.ts");
        let forward = vec!["vitest.config.*".to_string(), "vitest.workspace.*".to_string()];
        let backward: Vec<String> = forward.iter().rev().cloned().collect();

        resolver.find_nearest_config(&file, &forward);
        resolver.find_nearest_config(&file, &backward);
        assert_eq!(resolver.probe_count(), 1);
    }

    #[test]
    fn repeated_miss_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(project.join("go.mod"), "module x").unwrap();
        let resolver = ScopeResolver::new();
        let file = project.join("src/a.test.js");

        assert_eq!(resolver.find_nearest_config(&file, &patterns()), None);
        let first = resolver.probe_count();
        assert_eq!(resolver.find_nearest_config(&file, &patterns()), None);
        assert_eq!(resolver.probe_count(), first);
    }

    fn nested_root_layout() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let mono = dir.path().join("mono");
        fs::create_dir_all(mono.join("packages/app/src")).unwrap();
        fs::write(mono.join("jest.config.js"), "").unwrap();
        fs::write(mono.join("package.json"), "{}").unwrap();
        fs::write(mono.join("packages/app/package.json"), "{}").unwrap();
        (dir, mono)
    }

    #[test]
    fn sibling_lookup_does_not_widen_nested_root_walk() {
        let (_dir, mono) = nested_root_layout();
        let resolver = ScopeResolver::new();

        // packages/ is not a root, so the walk reaches mono/.
        assert_eq!(
            resolver.find_nearest_config(&mono.join("packages/b.test.js"), &patterns()),
            Some(mono.join("jest.config.js"))
        );
        // app/ is a root: the walk may look at packages/ and no further.
        assert_eq!(
            resolver.find_nearest_config(&mono.join("packages/app/src/a.test.js"), &patterns()),
            None
        );
    }

    #[test]
    fn nested_root_answer_is_independent_of_lookup_order() {
        let (_dir, mono) = nested_root_layout();
        let resolver = ScopeResolver::new();

        assert_eq!(
            resolver.find_nearest_config(&mono.join("packages/app/src/a.test.js"), &patterns()),
            None
        );
        assert_eq!(
            resolver.find_nearest_config(&mono.join("packages/b.test.js"), &patterns()),
            Some(mono.join("jest.config.js"))
        );
        // packages/ was listed by the first walk and reused by the second.
        assert_eq!(resolver.probe_count(), 4);
    }

    #[test]
    fn walk_stops_one_level_above_project_root() {
        let dir = tempfile::tempdir().unwrap();
        // Config two levels above the project root must not be found.
        fs::write(dir.path().join("jest.config.js"), "").unwrap();
        let project = dir.path().join("outer/project");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(project.join("package.json"), "{}").unwrap();

        let resolver = ScopeResolver::new();
        assert_eq!(
            resolver.find_nearest_config(&project.join("src/a.test.js"), &patterns()),
            None
        );
        // src, project, outer
        assert_eq!(resolver.probe_count(), 3);
    }

    #[test]
    fn config_just_above_root_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jest.config.js"), "").unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("go.mod"), "module x").unwrap();

        let resolver = ScopeResolver::new();
        assert_eq!(
            resolver.find_nearest_config(&project.join("a.test.js"), &patterns()),
            Some(dir.path().join("jest.config.js"))
        );
    }

    #[test]
    fn max_depth_bounds_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jest.config.js"), "").unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        let resolver = ScopeResolver::with_max_depth(2);
        assert_eq!(
            resolver.find_nearest_config(&dir.path().join("a/b/c/x.test.js"), &patterns()),
            None
        );
        assert_eq!(resolver.probe_count(), 2);
    }

    #[test]
    fn alphabetical_pattern_wins_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jest.config.ts"), "").unwrap();
        fs::write(dir.path().join("jest.config.js"), "").unwrap();
        let resolver = ScopeResolver::new();
        assert_eq!(
            resolver.find_nearest_config(&dir.path().join("a.test.js"), &patterns()),
            Some(dir.path().join("jest.config.js"))
        );
    }
}
