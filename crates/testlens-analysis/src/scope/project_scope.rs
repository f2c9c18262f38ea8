//! All config scopes of one project, keyed by config path.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config_scope::ConfigScope;

/// Every config scope found under a scan root.
///
/// Built once per scan and then only read, so it is shared across workers by
/// `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct AggregatedProjectScope {
    scopes: BTreeMap<PathBuf, Arc<ConfigScope>>,
}

impl AggregatedProjectScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scopes(scopes: impl IntoIterator<Item = Arc<ConfigScope>>) -> Self {
        let mut project = Self::new();
        for scope in scopes {
            project.insert(scope);
        }
        project
    }

    pub fn insert(&mut self, scope: Arc<ConfigScope>) {
        self.scopes.insert(scope.config_path().to_path_buf(), scope);
    }

    pub fn get(&self, config_path: &Path) -> Option<&Arc<ConfigScope>> {
        self.scopes.get(config_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConfigScope>> {
        self.scopes.values()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The scope that owns `path` among those `accept` allows.
    pub fn find_scope(
        &self,
        path: &Path,
        accept: impl Fn(&ConfigScope) -> bool,
    ) -> Option<Arc<ConfigScope>> {
        select_scope(
            path,
            self.scopes.values().filter(|s| accept(s) && s.contains(path)),
        )
        .cloned()
    }
}

/// Pick the winning scope for `path` among overlapping candidates: deepest
/// effective base directory, then longest config path, then the
/// lexicographically smallest config path.
pub fn select_scope<'a>(
    path: &Path,
    candidates: impl IntoIterator<Item = &'a Arc<ConfigScope>>,
) -> Option<&'a Arc<ConfigScope>> {
    candidates
        .into_iter()
        .filter_map(|s| s.effective_base(path).map(|base| (s, base.components().count())))
        .min_by(|(a, a_depth), (b, b_depth)| precedence(a, *a_depth, b, *b_depth))
        .map(|(s, _)| s)
}

fn precedence(a: &ConfigScope, a_depth: usize, b: &ConfigScope, b_depth: usize) -> Ordering {
    b_depth
        .cmp(&a_depth)
        .then_with(|| {
            let a_len = a.config_path().as_os_str().len();
            let b_len = b.config_path().as_os_str().len();
            b_len.cmp(&a_len)
        })
        .then_with(|| a.config_path().cmp(b.config_path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(config: &str, base: &str, framework: &str) -> Arc<ConfigScope> {
        Arc::new(ConfigScope::new(config, base, framework))
    }

    #[test]
    fn deepest_base_wins() {
        let project = AggregatedProjectScope::from_scopes([
            scope("/repo/jest.config.js", "/repo", "jest"),
            scope("/repo/web/vitest.config.ts", "/repo/web", "vitest"),
        ]);
        let found = project.find_scope(Path::new("/repo/web/a.test.ts"), |_| true).unwrap();
        assert_eq!(found.framework(), "vitest");
        let found = project.find_scope(Path::new("/repo/api/a.test.ts"), |_| true).unwrap();
        assert_eq!(found.framework(), "jest");
    }

    #[test]
    fn longer_config_path_breaks_depth_ties() {
        let project = AggregatedProjectScope::from_scopes([
            scope("/repo/jest.config.js", "/repo", "jest"),
            scope("/repo/vitest.config.mts", "/repo", "vitest"),
        ]);
        let found = project.find_scope(Path::new("/repo/a.test.ts"), |_| true).unwrap();
        assert_eq!(found.framework(), "vitest");
    }

    #[test]
    fn lexicographic_order_breaks_full_ties() {
        let project = AggregatedProjectScope::from_scopes([
            scope("/repo/b.config.js", "/repo", "b"),
            scope("/repo/a.config.js", "/repo", "a"),
        ]);
        let found = project.find_scope(Path::new("/repo/x.js"), |_| true).unwrap();
        assert_eq!(found.framework(), "a");
    }

    #[test]
    fn filter_excludes_scopes() {
        let project = AggregatedProjectScope::from_scopes([scope("/repo/pytest.ini", "/repo", "pytest")]);
        assert!(project
            .find_scope(Path::new("/repo/a.test.ts"), |s| s.framework() != "pytest")
            .is_none());
    }
}
