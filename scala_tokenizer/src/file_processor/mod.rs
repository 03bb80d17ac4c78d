//! Source file reading

mod processor;

use crate::config::runtime::FileProcessorPreferences;
pub use processor::{
    count_lines, FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError,
};

/// Process a file with default settings
pub fn process_file(
    file_path: impl AsRef<std::path::Path>,
) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::with_preferences(prefs)
}
