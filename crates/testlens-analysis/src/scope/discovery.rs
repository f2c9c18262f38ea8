//! Bulk config discovery for a scan: recognise config files among the walked
//! files, parse each once, and aggregate the resulting scopes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use testlens_core::errors::{ConfigError, ScanError, ScanPhase};

use super::config_scope::ConfigScope;
use super::project_scope::AggregatedProjectScope;
use crate::frameworks::{FrameworkDefinition, FrameworkRegistry};
use crate::scanner::cancellation::ScanCancellation;

/// A file recognised as some framework's configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigCandidate {
    pub path: PathBuf,
    pub framework: String,
}

/// Pick out config files among `paths`, sorted by path then framework.
pub fn discover_config_files<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
    registry: &FrameworkRegistry,
) -> Vec<ConfigCandidate> {
    let mut found = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        for def in registry.frameworks_for_config(name) {
            found.push(ConfigCandidate {
                path: path.to_path_buf(),
                framework: def.name.clone(),
            });
        }
    }
    found.sort();
    found
}

/// Read and parse one config file with its framework's parser.
pub fn parse_config(def: &FrameworkDefinition, path: &Path) -> Result<ConfigScope, ConfigError> {
    let parser = def.config_parser.as_ref().ok_or_else(|| ConfigError::Unsupported {
        framework: def.name.clone(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parser.parse(path, &content)
}

/// Parse every candidate into one [`AggregatedProjectScope`].
///
/// A config that fails to parse is reported and left out; the rest of the
/// project keeps its scopes. Stops early if `cancellation` fires.
pub fn build_project_scope(
    candidates: &[ConfigCandidate],
    registry: &FrameworkRegistry,
    cancellation: &ScanCancellation,
) -> (AggregatedProjectScope, Vec<ScanError>) {
    let mut project = AggregatedProjectScope::new();
    let mut errors = Vec::new();

    for candidate in candidates {
        if cancellation.check().is_err() {
            break;
        }
        let Some(def) = registry.get(&candidate.framework) else {
            continue;
        };
        match parse_config(def, &candidate.path) {
            Ok(scope) => {
                tracing::debug!(
                    config = %candidate.path.display(),
                    framework = %candidate.framework,
                    base_dir = %scope.base_dir().display(),
                    "config scope registered"
                );
                project.insert(Arc::new(scope));
            }
            Err(e) if e.is_not_applicable() => {
                tracing::debug!(config = %candidate.path.display(), framework = %candidate.framework, "no framework settings");
            }
            Err(e) => {
                tracing::warn!(config = %candidate.path.display(), error = %e, "config parse failed");
                errors.push(ScanError::new(&candidate.path, ScanPhase::ConfigParse, e));
            }
        }
    }
    (project, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovery_is_sorted_and_framework_tagged() {
        let registry = FrameworkRegistry::with_builtins();
        let paths = [
            PathBuf::from("/r/web/vitest.config.ts"),
            PathBuf::from("/r/jest.config.js"),
            PathBuf::from("/r/src/app.ts"),
        ];
        let found = discover_config_files(paths.iter().map(PathBuf::as_path), &registry);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].framework, "jest");
        assert_eq!(found[1].framework, "vitest");
    }

    #[test]
    fn broken_config_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jest.config.json"), "{ not json").unwrap();
        fs::create_dir(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web/vitest.config.ts"), "export default {}").unwrap();

        let registry = FrameworkRegistry::with_builtins();
        let candidates = discover_config_files(
            [dir.path().join("jest.config.json"), dir.path().join("web/vitest.config.ts")]
                .iter()
                .map(PathBuf::as_path),
            &registry,
        );
        let (project, errors) = build_project_scope(&candidates, &registry, &ScanCancellation::new());
        assert_eq!(project.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].phase, ScanPhase::ConfigParse);
    }
}
