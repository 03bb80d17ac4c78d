//! Directory tokenization
//!
//! Discovers matching source files under a directory and tokenizes them on
//! a small pool of scoped worker threads. Each worker owns its own
//! [`Scanner`] and [`FileProcessor`]; the reserved-word table is the only
//! state they share.

use crate::config::constants::compile_time::batch_processing::{
    MAX_FILES_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::runtime::{BatchPreferences, FileProcessorPreferences, LexicalPreferences};
use crate::file_processor::{FileProcessor, FileProcessorError};
use crate::lexical::{self, LexicalMetrics, Scanner};
use crate::logging::{self, codes};
use crate::tokens::{Token, TokenCounts};
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    /// Extensions without the leading dot, matched case-insensitively
    pub extensions: Vec<String>,
    pub fail_fast: bool,
}

impl BatchConfig {
    pub fn from_preferences(prefs: &BatchPreferences) -> Self {
        Self {
            max_threads: prefs.max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: prefs.recursive,
            extensions: prefs.extensions.clone(),
            fail_fast: prefs.fail_fast,
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

/// Tokens for one file of a batch
#[derive(Debug, Clone)]
pub struct FileTokens {
    pub path: PathBuf,
    pub tokens: Vec<Token>,
    pub metrics: LexicalMetrics,
    pub line_count: usize,
}

impl FileTokens {
    pub fn counts(&self) -> TokenCounts {
        TokenCounts::from_tokens(&self.tokens)
    }
}

/// A file that could not be read
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: FileProcessorError,
}

/// Batch processing results, sorted by path
#[derive(Debug, Default)]
pub struct BatchResults {
    pub files: Vec<FileTokens>,
    pub failures: Vec<BatchFailure>,
    pub duration: Duration,
}

impl BatchResults {
    pub fn success_count(&self) -> usize {
        self.files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn files_processed(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    pub fn total_tokens(&self) -> usize {
        self.files.iter().map(|f| f.tokens.len()).sum()
    }

    /// Per-kind totals across every successful file
    pub fn total_counts(&self) -> TokenCounts {
        self.files.iter().fold(TokenCounts::default(), |mut acc, f| {
            acc.add(&f.counts());
            acc
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files processed: {} tokenized, {} failed, {} tokens, {:.2}s",
            self.files_processed(),
            self.success_count(),
            self.failure_count(),
            self.total_tokens(),
            self.duration.as_secs_f64()
        )
    }

    fn merge(&mut self, other: WorkerOutput) {
        self.files.extend(other.files);
        self.failures.extend(other.failures);
    }

    fn sort(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("No files with extensions {extensions:?} found in: {path}")]
    NoFilesFound { path: String, extensions: Vec<String> },

    #[error("IO error during directory traversal of '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Batch worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NotADirectory { .. } => codes::batch::NOT_A_DIRECTORY,
            BatchError::NoFilesFound { .. } => codes::batch::NO_FILES_FOUND,
            BatchError::Io { .. } => codes::batch::DISCOVERY_IO_ERROR,
            BatchError::WorkerPanicked { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

#[derive(Default)]
struct WorkerOutput {
    files: Vec<FileTokens>,
    failures: Vec<BatchFailure>,
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover matching files under `dir_path`, sorted by path
pub fn discover_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.exists() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    if !dir_path.is_dir() {
        return Err(BatchError::NotADirectory {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
            extensions: config.extensions.clone(),
        });
    }

    files.sort();

    log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let io_error = |e: std::io::Error| BatchError::Io {
        path: dir_path.display().to_string(),
        message: e.to_string(),
    };

    let mut entries = fs::read_dir(dir_path)
        .map_err(io_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        if files.len() >= MAX_FILES_PER_BATCH {
            log_warning!(codes::batch::FILE_LIMIT_REACHED, "Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => MAX_FILES_PER_BATCH
            );
            return Ok(());
        }

        let path = entry.path();
        // Symlinked directories are not followed
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if path.is_file() && config.matches_extension(&path) {
            files.push(path);
        }
    }

    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub struct BatchProcessor {
    config: BatchConfig,
    file_preferences: FileProcessorPreferences,
    lexical_preferences: LexicalPreferences,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            file_preferences: FileProcessorPreferences::default(),
            lexical_preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_file_preferences(mut self, prefs: FileProcessorPreferences) -> Self {
        self.file_preferences = prefs;
        self
    }

    pub fn with_lexical_preferences(mut self, prefs: LexicalPreferences) -> Self {
        self.lexical_preferences = prefs;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Tokenize every matching file under `dir_path`.
    ///
    /// Unreadable files are reported in [`BatchResults::failures`]; only
    /// discovery problems and worker panics fail the whole batch.
    pub fn process_directory(&self, dir_path: impl AsRef<Path>) -> Result<BatchResults, BatchError> {
        let start_time = Instant::now();
        let dir_path = dir_path.as_ref();

        let files = discover_files(dir_path, &self.config)?;
        let workers = self.config.max_threads.clamp(1, MAX_WORKER_THREADS).min(files.len());
        let chunk_size = files.len().div_ceil(workers);

        log_info!("Starting batch tokenization",
            "directory" => dir_path.display(),
            "files" => files.len(),
            "workers" => workers
        );

        let stop = &AtomicBool::new(false);
        let mut results = BatchResults::default();

        let outputs: Vec<Result<WorkerOutput, BatchError>> = thread::scope(|scope| {
            let handles: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.run_worker(chunk, stop)))
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle.join().map_err(|_| BatchError::WorkerPanicked { worker })
                })
                .collect()
        });

        for output in outputs {
            match output {
                Ok(output) => results.merge(output),
                Err(error) => {
                    log_error!(error.error_code(), "Batch worker failed", "error" => error);
                    return Err(error);
                }
            }
        }

        results.sort();
        results.duration = start_time.elapsed();

        log_success!(
            codes::success::BATCH_COMPLETE,
            "Batch tokenization completed",
            "files_tokenized" => results.success_count(),
            "failed" => results.failure_count(),
            "tokens" => results.total_tokens(),
            "duration_ms" => format!("{:.2}", results.duration.as_secs_f64() * 1000.0)
        );

        Ok(results)
    }

    fn run_worker(&self, files: &[PathBuf], stop: &AtomicBool) -> WorkerOutput {
        let processor = FileProcessor::with_preferences(&self.file_preferences);
        let mut scanner = Scanner::with_preferences(self.lexical_preferences.clone());
        let mut output = WorkerOutput::default();

        for path in files {
            if self.config.fail_fast && stop.load(Ordering::Relaxed) {
                break;
            }

            let display = path.display().to_string();
            logging::with_file_context(&display, || match processor.process_file(path) {
                Ok(file_result) => {
                    let scanned = lexical::tokenize_file_result(&mut scanner, &file_result);
                    output.files.push(FileTokens {
                        path: path.clone(),
                        tokens: scanned.tokens,
                        metrics: scanned.metrics,
                        line_count: file_result.metadata.line_count,
                    });
                }
                Err(error) => {
                    if self.config.fail_fast {
                        stop.store(true, Ordering::Relaxed);
                        log_warning!(error.error_code(), "Fail-fast enabled, stopping batch",
                            "file" => display);
                    }
                    output.failures.push(BatchFailure {
                        path: path.clone(),
                        error,
                    });
                }
            });
        }

        output
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a directory with default configuration
pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    BatchProcessor::default().process_directory(dir_path)
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    BatchProcessor::new(config.clone()).process_directory(dir_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn config(threads: usize, recursive: bool) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            recursive,
            extensions: vec!["scala".to_string()],
            fail_fast: false,
        }
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("B.scala"), "object B").unwrap();
        fs::write(root.join("A.SCALA"), "object A").unwrap();
        fs::write(root.join("notes.txt"), "not scala").unwrap();
        fs::write(root.join("nested").join("C.scala"), "object C").unwrap();

        let flat = discover_files(root, &config(1, false)).unwrap();
        assert_eq!(flat, vec![root.join("A.SCALA"), root.join("B.scala")]);

        let deep = discover_files(root, &config(1, true)).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        assert_matches!(
            discover_files(&root.join("missing"), &config(1, true)),
            Err(BatchError::DirectoryNotFound { .. })
        );

        fs::write(root.join("A.scala"), "object A").unwrap();
        assert_matches!(
            discover_files(&root.join("A.scala"), &config(1, true)),
            Err(BatchError::NotADirectory { .. })
        );

        let empty = tempdir().unwrap();
        let error = discover_files(empty.path(), &config(1, true)).unwrap_err();
        assert_matches!(error, BatchError::NoFilesFound { .. });
        assert_eq!(error.error_code(), codes::batch::NO_FILES_FOUND);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        for name in ["A", "B", "C", "D", "E", "F", "G", "H", "I"] {
            fs::write(
                root.join(format!("{}.scala", name)),
                format!("object {} {{\n  val n = 1\n}}\n", name),
            )
            .unwrap();
        }

        let sequential = BatchProcessor::new(config(1, true))
            .process_directory(root)
            .unwrap();
        let parallel = BatchProcessor::new(config(4, true))
            .process_directory(root)
            .unwrap();

        assert_eq!(sequential.success_count(), 9);
        assert_eq!(parallel.success_count(), 9);
        for (a, b) in sequential.files.iter().zip(&parallel.files) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.tokens, b.tokens);
        }
        assert_eq!(parallel.total_tokens(), 9 * 8);
        assert_eq!(parallel.files[0].line_count, 3);
        assert_eq!(parallel.total_counts().reserved, 18);
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Good.scala"), "val x = 1").unwrap();
        let large = fs::File::create(root.join("Huge.scala")).unwrap();
        large
            .set_len(crate::file_processor::FileProcessor::max_file_size() + 1)
            .unwrap();

        let results = BatchProcessor::new(config(2, true))
            .process_directory(root)
            .unwrap();

        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.files_processed(), 2);
        assert!(results.summary().starts_with("2 files processed: 1 tokenized, 1 failed"));
        assert_matches!(
            results.failures[0].error,
            FileProcessorError::FileTooLarge { .. }
        );
        assert_eq!(results.files[0].tokens[0].kind(), TokenKind::Reserved);
    }

    #[test]
    fn test_fail_fast_stops_single_worker() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let large = fs::File::create(root.join("A.scala")).unwrap();
        large
            .set_len(crate::file_processor::FileProcessor::max_file_size() + 1)
            .unwrap();
        fs::write(root.join("B.scala"), "val b = 2").unwrap();

        let mut cfg = config(1, true);
        cfg.fail_fast = true;
        let results = BatchProcessor::new(cfg).process_directory(root).unwrap();

        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.success_count(), 0);
    }

    #[test]
    fn test_batch_config_from_preferences() {
        let prefs = BatchPreferences {
            max_threads: 64,
            recursive: false,
            extensions: vec!["sc".to_string()],
            fail_fast: true,
        };
        let config = BatchConfig::from_preferences(&prefs);
        assert_eq!(config.max_threads, MAX_WORKER_THREADS);
        assert!(!config.recursive);
        assert!(config.matches_extension(Path::new("x.SC")));
        assert!(!config.matches_extension(Path::new("x.scala")));
    }
}
