//! The region of a project claimed by one framework configuration file.

use std::path::{Path, PathBuf};

use super::globs::{normalize, GlobSet};

/// A nested project declared by a workspace-style config (jest `projects`,
/// vitest workspaces, pytest `testpaths`, phpunit test suites).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubProject {
    pub base_dir: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl SubProject {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: normalize(&base_dir.into()),
            include: Vec::new(),
            exclude: Vec::new(),
            include_set: GlobSet::default(),
            exclude_set: GlobSet::default(),
        }
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include_set = GlobSet::new(&include);
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude_set = GlobSet::new(&exclude);
        self.exclude = exclude;
        self
    }
}

/// What a config file says about which files its framework owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigScope {
    config_path: PathBuf,
    base_dir: PathBuf,
    framework: String,
    globals_mode: bool,
    include: Vec<String>,
    exclude: Vec<String>,
    projects: Vec<SubProject>,
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl ConfigScope {
    pub fn new(
        config_path: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        framework: impl Into<String>,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            base_dir: normalize(&base_dir.into()),
            framework: framework.into(),
            globals_mode: false,
            include: Vec::new(),
            exclude: Vec::new(),
            projects: Vec::new(),
            include_set: GlobSet::default(),
            exclude_set: GlobSet::default(),
        }
    }

    /// A scope rooted at the config file's own directory.
    pub fn at_config_dir(config_path: &Path, framework: impl Into<String>) -> Self {
        let base = config_path.parent().unwrap_or(Path::new("")).to_path_buf();
        Self::new(config_path, base, framework)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = normalize(&base_dir.into());
        self
    }

    pub fn with_globals_mode(mut self, enabled: bool) -> Self {
        self.globals_mode = enabled;
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include_set = GlobSet::new(&include);
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude_set = GlobSet::new(&exclude);
        self.exclude = exclude;
        self
    }

    pub fn with_projects(mut self, projects: Vec<SubProject>) -> Self {
        self.projects = projects;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn globals_mode(&self) -> bool {
        self.globals_mode
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn projects(&self) -> &[SubProject] {
        &self.projects
    }

    /// Whether this scope claims `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.effective_base(path).is_some()
    }

    /// The directory through which this scope claims `path`: the matching
    /// sub-project's base, or the scope's own base. `None` when unclaimed.
    pub fn effective_base(&self, path: &Path) -> Option<&Path> {
        let path = normalize(path);
        if self.projects.is_empty() {
            return self
                .admits(&path, &self.base_dir, &self.include_set, &self.exclude_set)
                .then_some(self.base_dir.as_path());
        }
        self.projects
            .iter()
            .filter(|p| {
                // Projects without their own filters inherit the scope's.
                let include = if p.include_set.is_empty() { &self.include_set } else { &p.include_set };
                let exclude = if p.exclude_set.is_empty() { &self.exclude_set } else { &p.exclude_set };
                self.admits(&path, &p.base_dir, include, exclude)
            })
            .max_by_key(|p| p.base_dir.components().count())
            .map(|p| p.base_dir.as_path())
    }

    fn admits(&self, path: &Path, base: &Path, include: &GlobSet, exclude: &GlobSet) -> bool {
        let Ok(relative) = path.strip_prefix(base) else {
            return false;
        };
        if !exclude.is_empty() && exclude.matches(relative, path) {
            return false;
        }
        include.is_empty() || include.matches(relative, path)
    }
}
