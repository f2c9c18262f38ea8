//! Top-level Scanner orchestrating walk → config scopes → candidates → detect → parse.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use rayon::prelude::*;
use testlens_core::errors::{Interruption, ParseError, ScanError, ScanErrorKind, ScanPhase};
use testlens_core::ScanConfig;

use super::cancellation::ScanCancellation;
use super::conventions;
use super::language_detect::Language;
use super::types::{ScanInterrupted, ScanResult, ScanStats};
use super::walker;
use crate::detection::{ConfidenceLevel, Detector};
use crate::frameworks::{FrameworkRegistry, Inventory, ParseContext, TestFile};
use crate::parsers::ParserManager;
use crate::scope::globs::GlobSet;
use crate::scope::{build_project_scope, discover_config_files, AggregatedProjectScope};

/// What happened to one candidate file.
enum FileOutcome {
    /// The scan was interrupted before the file was touched.
    NotStarted(Interruption),
    /// Read and detected, but no framework claimed it.
    Unmatched(ConfidenceLevel),
    Parsed(TestFile, ConfidenceLevel),
    Failed(ScanError, Option<ConfidenceLevel>),
    /// Parsing stopped part way through because of the interruption.
    Halted(ScanError, Interruption, ConfidenceLevel),
}

/// A candidate that passed discovery filters.
struct Candidate {
    path: PathBuf,
    language: Language,
}

/// The scanner: owns the parser resources, hands each scan its own
/// cancellation token, and retains the project scope of the last full scan
/// for `scan_files`.
pub struct Scanner {
    registry: Arc<FrameworkRegistry>,
    detector: Detector,
    parsers: ParserManager,
    cancellation: RwLock<ScanCancellation>,
    project_scope: RwLock<Option<Arc<AggregatedProjectScope>>>,
}

impl Scanner {
    pub fn new(registry: Arc<FrameworkRegistry>) -> Self {
        Self {
            detector: Detector::new(Arc::clone(&registry)),
            registry,
            parsers: ParserManager::new(),
            cancellation: RwLock::new(ScanCancellation::new()),
            project_scope: RwLock::new(None),
        }
    }

    /// A scanner over the built-in framework set.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(FrameworkRegistry::with_builtins()))
    }

    /// Cancellation handle of the most recently started scan.
    ///
    /// Every [`Scanner::scan`] / [`Scanner::scan_files`] call gets a fresh
    /// token, so cancelling one scan never leaks into the next and concurrent
    /// scans do not clear each other. To cancel a scan before it starts, pass
    /// a token to [`Scanner::scan_with_cancellation`].
    pub fn cancellation(&self) -> ScanCancellation {
        self.cancellation
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn publish(&self, token: &ScanCancellation) {
        *self.cancellation.write().unwrap_or_else(|e| e.into_inner()) = token.clone();
    }

    pub fn registry(&self) -> &FrameworkRegistry {
        &self.registry
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn parsers(&self) -> &ParserManager {
        &self.parsers
    }

    /// Project scope built by the most recent full scan, if any.
    pub fn project_scope(&self) -> Option<Arc<AggregatedProjectScope>> {
        self.project_scope
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(Arc::clone))
    }

    /// Scan everything under `root`.
    ///
    /// Per-file failures land in `ScanResult::errors`. A deadline or
    /// cancellation returns the partial result inside [`ScanInterrupted`].
    pub fn scan(&self, root: &Path, config: &ScanConfig) -> Result<ScanResult, ScanInterrupted> {
        self.scan_with_cancellation(root, config, &ScanCancellation::new())
    }

    /// [`Scanner::scan`] under a caller-owned token. A token cancelled before
    /// the call is honoured: the scan returns `Cancelled` with nothing parsed.
    pub fn scan_with_cancellation(
        &self,
        root: &Path,
        config: &ScanConfig,
        cancellation: &ScanCancellation,
    ) -> Result<ScanResult, ScanInterrupted> {
        let started = Instant::now();
        self.publish(cancellation);
        let cancel = cancellation.with_timeout(config.effective_timeout());
        let root = absolute(root);

        tracing::info!(
            root = %root.display(),
            workers = config.effective_workers(),
            frameworks = self.registry.len(),
            "scan started"
        );

        let mut stats = ScanStats::default();
        let mut errors = Vec::new();

        // Phase 1: Discovery
        let files = match walker::walk_directory(&root, config, &cancel) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "scan root unreadable");
                errors.push(ScanError::new(&root, ScanPhase::Discovery, e));
                Vec::new()
            }
        };
        stats.files_discovered = files.len();
        if let Err(reason) = cancel.check() {
            return Err(interrupted(Vec::new(), errors, stats, started, reason));
        }

        // Phase 2: Config scopes
        let configs = discover_config_files(files.iter().map(|f| f.path.as_path()), &self.registry);
        let (project, config_errors) = build_project_scope(&configs, &self.registry, &cancel);
        errors.extend(config_errors);
        stats.config_scopes = project.len();
        if let Err(reason) = cancel.check() {
            return Err(interrupted(Vec::new(), errors, stats, started, reason));
        }
        let project = Arc::new(project);
        if let Ok(mut slot) = self.project_scope.write() {
            *slot = Some(Arc::clone(&project));
        }

        // Phase 3: Candidates
        let include = GlobSet::new(&config.include);
        let max_file_size = config.effective_max_file_size();
        let mut candidates = Vec::new();
        for file in &files {
            let Some(language) = file.language else {
                continue;
            };
            let relative = file.path.strip_prefix(&root).unwrap_or(&file.path);
            if !conventions::is_test_file(relative, language) {
                continue;
            }
            if !include.is_empty() && !include.matches(relative, &file.path) {
                continue;
            }
            if file.file_size > max_file_size {
                tracing::debug!(
                    path = %file.path.display(),
                    size = file.file_size,
                    limit = max_file_size,
                    "skipping oversize candidate"
                );
                stats.files_skipped += 1;
                continue;
            }
            candidates.push(Candidate {
                path: file.path.clone(),
                language,
            });
        }

        // Phase 4: Detect + parse
        self.process(candidates, &project, config, &cancel, stats, errors, started)
    }

    /// Scan an explicit list of files (absolute, or relative to `root`).
    ///
    /// Reuses the project scope retained from the last [`Scanner::scan`];
    /// builds one from `root` when there is none. Naming conventions and
    /// `include` are not applied: the caller already chose the files.
    pub fn scan_files(
        &self,
        root: &Path,
        files: &[PathBuf],
        config: &ScanConfig,
    ) -> Result<ScanResult, ScanInterrupted> {
        self.scan_files_with_cancellation(root, files, config, &ScanCancellation::new())
    }

    /// [`Scanner::scan_files`] under a caller-owned token.
    pub fn scan_files_with_cancellation(
        &self,
        root: &Path,
        files: &[PathBuf],
        config: &ScanConfig,
        cancellation: &ScanCancellation,
    ) -> Result<ScanResult, ScanInterrupted> {
        let started = Instant::now();
        self.publish(cancellation);
        let cancel = cancellation.with_timeout(config.effective_timeout());
        let root = absolute(root);

        tracing::info!(root = %root.display(), files = files.len(), "incremental scan started");

        let mut stats = ScanStats::default();
        let mut errors = Vec::new();

        let project = match self.project_scope() {
            Some(project) => project,
            None => {
                let walked = walker::walk_directory(&root, config, &cancel).unwrap_or_else(|e| {
                    tracing::warn!(root = %root.display(), error = %e, "config discovery skipped");
                    Vec::new()
                });
                let configs =
                    discover_config_files(walked.iter().map(|f| f.path.as_path()), &self.registry);
                let (project, config_errors) = build_project_scope(&configs, &self.registry, &cancel);
                errors.extend(config_errors);
                if let Err(reason) = cancel.check() {
                    return Err(interrupted(Vec::new(), errors, stats, started, reason));
                }
                let project = Arc::new(project);
                if let Ok(mut slot) = self.project_scope.write() {
                    *slot = Some(Arc::clone(&project));
                }
                project
            }
        };
        stats.config_scopes = project.len();

        let max_file_size = config.effective_max_file_size();
        let mut candidates = Vec::new();
        for file in files {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                root.join(file)
            };
            let Some(language) = Language::from_path(&path) else {
                stats.files_skipped += 1;
                continue;
            };
            match fs::metadata(&path) {
                Ok(meta) if meta.len() > max_file_size => {
                    stats.files_skipped += 1;
                    errors.push(ScanError::new(
                        &path,
                        ScanPhase::Discovery,
                        ScanErrorKind::FileTooLarge {
                            size: meta.len(),
                            limit: max_file_size,
                        },
                    ));
                }
                Ok(_) => candidates.push(Candidate { path, language }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "file scan error");
                    errors.push(ScanError::new(&path, ScanPhase::Discovery, e));
                }
            }
        }

        self.process(candidates, &project, config, &cancel, stats, errors, started)
    }

    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        candidates: Vec<Candidate>,
        project: &AggregatedProjectScope,
        config: &ScanConfig,
        cancel: &ScanCancellation,
        mut stats: ScanStats,
        mut errors: Vec<ScanError>,
        started: Instant,
    ) -> Result<ScanResult, ScanInterrupted> {
        let workers = config.effective_workers();
        let outcomes: Vec<FileOutcome> = install(workers, || {
            candidates
                .par_iter()
                .map(|candidate| self.process_file(candidate, project, cancel))
                .collect()
        });

        let mut files = Vec::new();
        let mut interruption = None;
        for outcome in outcomes {
            match outcome {
                FileOutcome::NotStarted(reason) => {
                    interruption.get_or_insert(reason);
                }
                FileOutcome::Unmatched(level) => {
                    stats.files_scanned += 1;
                    stats.confidence_histogram.record(level);
                }
                FileOutcome::Parsed(file, level) => {
                    stats.files_scanned += 1;
                    stats.files_matched += 1;
                    stats.confidence_histogram.record(level);
                    *stats.frameworks.entry(file.framework.clone()).or_insert(0) += 1;
                    files.push(file);
                }
                FileOutcome::Failed(error, level) => {
                    stats.files_scanned += 1;
                    stats.files_failed += 1;
                    if let Some(level) = level {
                        stats.confidence_histogram.record(level);
                        if level != ConfidenceLevel::None {
                            stats.files_matched += 1;
                        }
                    }
                    errors.push(error);
                }
                FileOutcome::Halted(error, reason, level) => {
                    stats.files_scanned += 1;
                    stats.files_failed += 1;
                    stats.confidence_histogram.record(level);
                    errors.push(error);
                    interruption.get_or_insert(reason);
                }
            }
        }

        match interruption {
            Some(reason) => Err(interrupted(files, errors, stats, started, reason)),
            None => {
                let result = finish(files, errors, stats, started);
                tracing::info!(
                    scanned = result.stats.files_scanned,
                    matched = result.stats.files_matched,
                    failed = result.stats.files_failed,
                    skipped = result.stats.files_skipped,
                    duration_ms = result.stats.duration.as_millis() as u64,
                    "scan complete"
                );
                Ok(result)
            }
        }
    }

    fn process_file(
        &self,
        candidate: &Candidate,
        project: &AggregatedProjectScope,
        cancel: &ScanCancellation,
    ) -> FileOutcome {
        if let Err(reason) = cancel.check() {
            return FileOutcome::NotStarted(reason);
        }
        let path = candidate.path.as_path();

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "file scan error");
                return FileOutcome::Failed(ScanError::new(path, ScanPhase::Discovery, e), None);
            }
        };

        let detection = self.detector.detect_with_scope(path, &content, project);
        let level = detection.level();
        if detection.is_unknown() {
            tracing::trace!(path = %path.display(), "no framework claimed file");
            return FileOutcome::Unmatched(level);
        }

        let Some(def) = self.registry.get(&detection.framework) else {
            let error = ScanError::new(
                path,
                ScanPhase::Detection,
                ScanErrorKind::Detection {
                    message: format!("framework '{}' is not registered", detection.framework),
                },
            );
            return FileOutcome::Failed(error, Some(level));
        };
        let Some(parser) = def.parser.as_deref() else {
            let error = ScanError::new(
                path,
                ScanPhase::Parsing,
                ScanErrorKind::NoParser {
                    framework: def.name.clone(),
                    language: candidate.language.name().to_string(),
                },
            );
            return FileOutcome::Failed(error, Some(level));
        };

        let cx = ParseContext {
            parsers: &self.parsers,
            cancellation: cancel,
            framework: &def.name,
        };
        match parser.parse(&cx, &content, path) {
            Ok(mut file) => {
                file.framework = def.name.clone();
                file.confidence = detection.confidence;
                FileOutcome::Parsed(file, level)
            }
            Err(ParseError::Interrupted(reason)) => FileOutcome::Halted(
                ScanError::new(path, ScanPhase::Parsing, ParseError::Interrupted(reason)),
                reason,
                level,
            ),
            Err(e) => {
                tracing::warn!(path = %path.display(), framework = %def.name, error = %e, "parse failed");
                FileOutcome::Failed(ScanError::new(path, ScanPhase::Parsing, e), Some(level))
            }
        }
    }
}

/// Run `op` on a dedicated pool of `workers` threads.
fn install<R: Send>(workers: usize, op: impl FnOnce() -> R + Send) -> R {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("testlens-scan-{i}"))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            tracing::warn!(error = %e, "worker pool unavailable, using the global pool");
            op()
        }
    }
}

fn absolute(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

fn finish(
    mut files: Vec<TestFile>,
    mut errors: Vec<ScanError>,
    mut stats: ScanStats,
    started: Instant,
) -> ScanResult {
    files.sort_by(|a, b| a.path.cmp(&b.path));
    errors.sort_by(|a, b| a.path.cmp(&b.path).then(a.phase.cmp(&b.phase)));
    stats.duration = started.elapsed();
    ScanResult {
        inventory: Inventory { files },
        errors,
        stats,
    }
}

fn interrupted(
    files: Vec<TestFile>,
    errors: Vec<ScanError>,
    stats: ScanStats,
    started: Instant,
    reason: Interruption,
) -> ScanInterrupted {
    let result = finish(files, errors, stats, started);
    tracing::info!(
        reason = %reason,
        parsed = result.inventory.files.len(),
        scanned = result.stats.files_scanned,
        "scan interrupted"
    );
    ScanInterrupted { result, reason }
}
