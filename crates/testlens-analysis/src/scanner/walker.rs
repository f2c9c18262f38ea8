//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Honours `.gitignore`, `.testlensignore` (gitignore syntax, hierarchical),
//! the default ignore list and the user's `exclude` patterns.

use std::io;
use std::path::Path;

use crossbeam_channel as channel;
use testlens_core::ScanConfig;

use super::cancellation::ScanCancellation;
use super::language_detect::Language;
use super::types::DiscoveredFile;

/// Directories never worth descending into.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    ".turbo",
    "__pycache__",
    ".pytest_cache",
    "coverage",
    ".nyc_output",
    "vendor",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".gradle",
];

pub const IGNORE_FILENAME: &str = ".testlensignore";

/// Walk `root` in parallel and return every regular file, sorted by path.
///
/// Stops descending once `cancellation` fires; the files seen so far are
/// still returned.
pub fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    cancellation: &ScanCancellation,
) -> io::Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("scan root is not a directory: {}", root.display()),
        ));
    }

    let (tx, rx) = channel::unbounded();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILENAME)
        .follow_links(config.effective_follow_symlinks())
        .threads(config.effective_workers());

    // Only negated patterns: a positive override would act as a whitelist and
    // hide config files. `include` is applied to candidates by the scanner.
    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        let _ = overrides.add(&format!("!{pattern}/**"));
        let _ = overrides.add(&format!("!{pattern}"));
    }
    for pattern in &config.exclude {
        if let Err(e) = overrides.add(&format!("!{pattern}")) {
            tracing::warn!(pattern = %pattern, error = %e, "ignoring malformed exclude pattern");
        }
    }
    match overrides.build() {
        Ok(built) => {
            builder.overrides(built);
        }
        Err(e) => tracing::warn!(error = %e, "exclude overrides disabled"),
    }

    builder.build_parallel().run(|| {
        let tx = tx.clone();
        let cancellation = cancellation.clone();
        Box::new(move |entry| {
            if cancellation.check().is_err() {
                return ignore::WalkState::Quit;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "walk entry skipped");
                    return ignore::WalkState::Continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }

            let file_size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(_) => return ignore::WalkState::Continue,
            };

            let path = entry.into_path();
            let language = Language::from_path(&path);
            let _ = tx.send(DiscoveredFile {
                path,
                file_size,
                language,
            });

            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files: Vec<DiscoveredFile> = rx.into_iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn default_ignores_and_sorting() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/b.test.ts");
        touch(dir.path(), "src/a.test.ts");
        touch(dir.path(), "node_modules/lib/index.test.js");
        touch(dir.path(), "dist/out.test.js");

        let files =
            walk_directory(dir.path(), &ScanConfig::default(), &ScanCancellation::new()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![Path::new("src/a.test.ts"), Path::new("src/b.test.ts")]
        );
        assert_eq!(files[0].language, Some(Language::TypeScript));
    }

    #[test]
    fn user_excludes_apply() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep/a_test.go");
        touch(dir.path(), "fixtures/b_test.go");
        let config = ScanConfig {
            exclude: vec!["fixtures".to_string()],
            ..Default::default()
        };
        let files = walk_directory(dir.path(), &config, &ScanCancellation::new()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("keep/a_test.go"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = walk_directory(
            &dir.path().join("nope"),
            &ScanConfig::default(),
            &ScanCancellation::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn cancelled_walk_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.test.ts");
        let cancel = ScanCancellation::new();
        cancel.cancel();
        let files = walk_directory(dir.path(), &ScanConfig::default(), &cancel).unwrap();
        assert!(files.is_empty());
    }
}
