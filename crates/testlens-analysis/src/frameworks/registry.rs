//! Framework registry: an explicit value built once and shared read-only.

use super::definition::FrameworkDefinition;
use super::types::Signal;
use crate::scanner::language_detect::Language;

/// Registered frameworks, kept in matcher-evaluation order
/// (priority descending, then name).
#[derive(Debug, Default)]
pub struct FrameworkRegistry {
    frameworks: Vec<FrameworkDefinition>,
}

impl FrameworkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in framework.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_builtins(&mut registry);
        registry
    }

    /// Add a framework. A definition with an existing name replaces it.
    pub fn register(&mut self, def: FrameworkDefinition) {
        if let Some(pos) = self.frameworks.iter().position(|f| f.name == def.name) {
            tracing::debug!(framework = %def.name, "replacing registered framework");
            self.frameworks.remove(pos);
        }
        self.frameworks.push(def);
        self.frameworks
            .sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
    }

    pub fn get(&self, name: &str) -> Option<&FrameworkDefinition> {
        self.frameworks.iter().find(|f| f.name == name)
    }

    pub fn all(&self) -> &[FrameworkDefinition] {
        &self.frameworks
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.frameworks.iter().map(|f| f.name.as_str())
    }

    pub fn for_language(&self, language: Language) -> impl Iterator<Item = &FrameworkDefinition> {
        self.frameworks.iter().filter(move |f| f.supports(language))
    }

    /// Whether any registered framework handles `language`.
    pub fn supports(&self, language: Language) -> bool {
        self.frameworks.iter().any(|f| f.supports(language))
    }

    /// Every config-file glob across frameworks, sorted and deduplicated.
    pub fn config_patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self
            .frameworks
            .iter()
            .flat_map(|f| f.config_patterns.iter().cloned())
            .collect();
        patterns.sort();
        patterns.dedup();
        patterns
    }

    /// Frameworks claiming a config file with this base name.
    pub fn frameworks_for_config(&self, file_name: &str) -> Vec<&FrameworkDefinition> {
        let signal = Signal::config_file(file_name);
        self.frameworks
            .iter()
            .filter(|f| f.has_config() && f.match_signal(&signal).is_match())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.frameworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
    }
}
