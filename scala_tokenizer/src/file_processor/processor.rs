//! Reads source files for the scanner

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, SCALA_EXTENSION,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .scala, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn from_io(error: &io::Error, path: &Path) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: path.display().to_string(),
            },
            io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: path.display().to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("'{}': {}", path.display(), error),
            },
        }
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lower-cased extension, if any
    pub extension: Option<String>,
    /// Lines as the scanner counts them: LF, CR and CRLF each end one line
    pub line_count: usize,
    pub is_scala_file: bool,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// Raw file bytes plus metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// Unmodified file contents; the scanner does not require UTF-8
    pub source: Vec<u8>,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn byte_count(&self) -> usize {
        self.source.len()
    }

    pub fn is_valid_utf8(&self) -> bool {
        std::str::from_utf8(&self.source).is_ok()
    }

    /// Bytes per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.byte_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

/// Count lines the way the scanner does. A trailing terminator does not
/// open a new line.
pub fn count_lines(source: &[u8]) -> usize {
    let mut lines = 0;
    let mut bytes = source.iter().peekable();
    while let Some(&byte) = bytes.next() {
        match byte {
            b'\r' if bytes.peek() == Some(&&b'\n') => {}
            b'\r' | b'\n' => lines += 1,
            _ => {}
        }
    }
    match source.last() {
        Some(b'\r' | b'\n') | None => lines,
        Some(_) => lines + 1,
    }
}

pub struct FileProcessor {
    /// Reject files without a .scala extension
    pub require_scala_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_scala_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn with_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_scala_extension: prefs.require_scala_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_scala_extension_required(mut self, required: bool) -> Self {
        self.require_scala_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Validate and read one file
    pub fn process_file(
        &self,
        file_path: impl AsRef<Path>,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let file_path = file_path.as_ref();
        let display = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata)?;

        let source = fs::read(&path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, &path);
            log_error!(error.error_code(), "Failed to read file", "file" => display, "io_error" => e);
            error
        })?;

        metadata.size = source.len() as u64;
        metadata.line_count = count_lines(&source);

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result);
        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult) {
        let path = result.metadata.path.display();
        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read with performance metrics",
                "file" => path,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0),
                "bytes_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file(),
                "utf8" => result.is_valid_utf8()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read",
                "file" => path,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count
            );
        }
    }

    fn validate_path(&self, file_path: &Path) -> Result<PathBuf, FileProcessorError> {
        if file_path.as_os_str().is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: String::new(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        if !file_path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.display().to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path.display());
            return Err(error);
        }

        if !file_path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.display().to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path.display());
            return Err(error);
        }

        file_path.canonicalize().map_err(|e| {
            let error = FileProcessorError::from_io(&e, file_path);
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path.display(),
                "io_error" => e);
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path);
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e);
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_scala_file = extension.as_deref() == Some(SCALA_EXTENSION);

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_scala_file,
        })
    }

    fn validate_file(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size limit",
                "file" => metadata.path.display(),
                "size_human" => metadata.human_readable_size(),
                "limit_bytes" => MAX_FILE_SIZE);
            return Err(error);
        }

        if self.require_scala_extension && !metadata.is_scala_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have required .scala extension",
                "file" => metadata.path.display(),
                "extension" => metadata.extension.as_deref().unwrap_or("none"));
            return Err(error);
        }

        Ok(())
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
