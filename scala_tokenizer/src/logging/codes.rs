//! Error, warning and success codes with their metadata
//!
//! Every code the crate logs is declared here and described once in the
//! registry table at the bottom of the file.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR004");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical warnings. The scanner never fails, so these are informational.
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_STRING: Code = Code::new("W020");
    pub const UNTERMINATED_CHAR: Code = Code::new("W021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("W022");
}

/// Directory batch error codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E300");
    pub const NOT_A_DIRECTORY: Code = Code::new("E301");
    pub const NO_FILES_FOUND: Code = Code::new("E302");
    pub const WORKER_FAILURE: Code = Code::new("E303");
    pub const DISCOVERY_IO_ERROR: Code = Code::new("E304");
    pub const FILE_LIMIT_REACHED: Code = Code::new("W300");
}

/// Output error codes
pub mod output {
    use super::Code;

    pub const SERIALIZATION_ERROR: Code = Code::new("E310");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const BATCH_COMPLETE: Code = Code::new("I030");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const fn entry(
    code: Code,
    category: &'static str,
    severity: Severity,
    recoverable: bool,
    description: &'static str,
) -> CodeMetadata {
    CodeMetadata {
        code: code.0,
        category,
        severity,
        recoverable,
        description,
    }
}

const REGISTRY_TABLE: &[CodeMetadata] = &[
    // System
    entry(system::INTERNAL_ERROR, "System", Severity::Critical, false, "Internal tokenizer error"),
    entry(system::INITIALIZATION_FAILURE, "System", Severity::Critical, false, "Tokenizer initialization failed"),
    entry(system::CONFIGURATION_ERROR, "System", Severity::High, false, "Configuration file could not be loaded"),
    // File processing
    entry(file_processing::FILE_NOT_FOUND, "FileProcessing", Severity::Medium, false, "File not found at specified path"),
    entry(file_processing::INVALID_EXTENSION, "FileProcessing", Severity::Low, true, "File does not have a .scala extension"),
    entry(file_processing::FILE_TOO_LARGE, "FileProcessing", Severity::Medium, false, "File exceeds maximum size limit"),
    entry(file_processing::PERMISSION_DENIED, "FileProcessing", Severity::Medium, false, "Permission denied accessing file"),
    entry(file_processing::IO_ERROR, "FileProcessing", Severity::High, false, "I/O error while reading file"),
    entry(file_processing::INVALID_PATH, "FileProcessing", Severity::Medium, false, "Path is empty or not a regular file"),
    // Lexical
    entry(lexical::UNTERMINATED_STRING, "Lexical", Severity::Low, true, "Input ended inside a string literal"),
    entry(lexical::UNTERMINATED_CHAR, "Lexical", Severity::Low, true, "Input ended inside a character literal"),
    entry(lexical::UNTERMINATED_COMMENT, "Lexical", Severity::Low, true, "Input ended inside a block comment"),
    // Batch
    entry(batch::DIRECTORY_NOT_FOUND, "Batch", Severity::Medium, false, "Batch directory not found"),
    entry(batch::NOT_A_DIRECTORY, "Batch", Severity::Medium, false, "Batch path is not a directory"),
    entry(batch::NO_FILES_FOUND, "Batch", Severity::Low, true, "No matching source files in directory"),
    entry(batch::WORKER_FAILURE, "Batch", Severity::High, false, "A batch worker thread panicked"),
    entry(batch::DISCOVERY_IO_ERROR, "Batch", Severity::Medium, false, "I/O error during file discovery"),
    entry(batch::FILE_LIMIT_REACHED, "Batch", Severity::Low, true, "Discovery stopped at the per-batch file limit"),
    // Output
    entry(output::SERIALIZATION_ERROR, "Output", Severity::Medium, false, "Token report serialization failed"),
    // Success
    entry(success::SYSTEM_INITIALIZATION_COMPLETED, "Success", Severity::Low, true, "Logging and tokenizer initialized"),
    entry(success::FILE_PROCESSING_SUCCESS, "Success", Severity::Low, true, "Source file read"),
    entry(success::TOKENIZATION_COMPLETE, "Success", Severity::Low, true, "Token sequence produced"),
    entry(success::BATCH_COMPLETE, "Success", Severity::Low, true, "Directory tokenization finished"),
];

static REGISTRY: OnceLock<HashMap<&'static str, &'static CodeMetadata>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, &'static CodeMetadata> {
    REGISTRY.get_or_init(|| REGISTRY_TABLE.iter().map(|m| (m.code, m)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_metadata(code: &str) -> Option<&'static CodeMetadata> {
    registry().get(code).copied()
}

pub fn is_registered(code: &str) -> bool {
    registry().contains_key(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code).map(|m| m.recoverable).unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown code")
}

pub fn get_category(code: &str) -> &'static str {
    get_metadata(code).map(|m| m.category).unwrap_or("Unknown")
}
