// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::constants::compile_time::batch_processing::{
    DEFAULT_EXTENSIONS, MAX_WORKER_THREADS,
};

/// Read an environment variable and parse it, falling back to `default`
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a .scala extension
    pub require_scala_extension: bool,

    /// Whether to include timing and rate figures in success events
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_scala_extension: env_or(env_vars::REQUIRE_SCALA_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to count comments and skipped literals while scanning
    pub collect_detailed_metrics: bool,

    /// Whether to tally merged operator spellings
    pub track_operator_patterns: bool,

    /// Whether to warn when input ends inside a string, char literal or comment
    pub warn_on_unterminated: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            track_operator_patterns: env_or(env_vars::LEXICAL_TRACK_OPERATORS, false),
            warn_on_unterminated: env_or(env_vars::LEXICAL_WARN_UNTERMINATED, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads used for directory tokenization
    pub max_threads: usize,

    /// Whether to descend into subdirectories
    pub recursive: bool,

    /// File extensions (without the dot) picked up by discovery
    pub extensions: Vec<String>,

    /// Stop scheduling new files after the first failure
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let extensions = env::var(env_vars::BATCH_EXTENSIONS)
            .ok()
            .map(|v| parse_extension_list(&v))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());

        Self {
            max_threads: env_or(env_vars::BATCH_MAX_THREADS, 4).clamp(1, MAX_WORKER_THREADS),
            recursive: env_or(env_vars::BATCH_RECURSIVE, true),
            extensions,
            fail_fast: env_or(env_vars::BATCH_FAIL_FAST, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to emit JSON lines instead of human readable events
    pub use_structured_logging: bool,

    /// Whether to write events to stderr at all
    pub enable_console_logging: bool,

    /// Events below this level are dropped
    pub min_log_level: LogLevel,

    /// Whether to attach the current file to events
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Whether an event at `level` passes a filter set to `self`
    pub fn allows(&self, level: LogLevel) -> bool {
        level <= *self
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Split a comma separated extension list, dropping leading dots and blanks
fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    Parse { message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        use crate::logging::codes;
        match self {
            ConfigError::Io { .. } => codes::system::CONFIGURATION_ERROR,
            ConfigError::Parse { .. } => codes::system::CONFIGURATION_ERROR,
        }
    }
}

/// All user-tunable preferences, grouped the way the TOML file is laid out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimePreferences {
    pub lexical: LexicalPreferences,
    pub file_processor: FileProcessorPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimePreferences {
    /// Preferences from environment variables only
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Parse a TOML document; absent sections and keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut prefs: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        prefs.batch.max_threads = prefs.batch.max_threads.clamp(1, MAX_WORKER_THREADS);
        Ok(prefs)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_SCALA_EXTENSION: &str = "SCALA_TOKENIZER_REQUIRE_SCALA_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "SCALA_TOKENIZER_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "SCALA_TOKENIZER_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_TRACK_OPERATORS: &str = "SCALA_TOKENIZER_LEXICAL_TRACK_OPERATORS";
    pub const LEXICAL_WARN_UNTERMINATED: &str = "SCALA_TOKENIZER_LEXICAL_WARN_UNTERMINATED";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "SCALA_TOKENIZER_BATCH_MAX_THREADS";
    pub const BATCH_RECURSIVE: &str = "SCALA_TOKENIZER_BATCH_RECURSIVE";
    pub const BATCH_EXTENSIONS: &str = "SCALA_TOKENIZER_BATCH_EXTENSIONS";
    pub const BATCH_FAIL_FAST: &str = "SCALA_TOKENIZER_BATCH_FAIL_FAST";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SCALA_TOKENIZER_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SCALA_TOKENIZER_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SCALA_TOKENIZER_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "SCALA_TOKENIZER_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level(" info "), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_log_level_filtering() {
        assert!(LogLevel::Warning.allows(LogLevel::Error));
        assert!(LogLevel::Warning.allows(LogLevel::Warning));
        assert!(!LogLevel::Warning.allows(LogLevel::Info));
        assert!(LogLevel::Debug.allows(LogLevel::Debug));
    }

    #[test]
    fn test_extension_list_parsing() {
        assert_eq!(parse_extension_list(".scala, sc,,"), vec!["scala", "sc"]);
        assert!(parse_extension_list(" , ").is_empty());
    }

    #[test]
    fn test_toml_sections_override_defaults() {
        let prefs = RuntimePreferences::from_toml_str(
            r#"
            [lexical]
            track_operator_patterns = true

            [batch]
            max_threads = 64
            extensions = ["scala", "sc"]

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(prefs.lexical.track_operator_patterns);
        assert_eq!(prefs.batch.max_threads, MAX_WORKER_THREADS);
        assert_eq!(prefs.batch.extensions, vec!["scala", "sc"]);
        assert_eq!(prefs.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = RuntimePreferences::from_toml_str("[batch]\nmax_threads = \"many\"");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[file_processor]\nrequire_scala_extension = true").unwrap();

        let prefs = RuntimePreferences::load_from_file(file.path()).unwrap();
        assert!(prefs.file_processor.require_scala_extension);

        let missing = RuntimePreferences::load_from_file("/definitely/not/here.toml");
        assert_matches!(missing, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let prefs = RuntimePreferences::default();
        let text = prefs.to_toml_string().unwrap();
        let parsed = RuntimePreferences::from_toml_str(&text).unwrap();
        assert_eq!(parsed.batch.extensions, prefs.batch.extensions);
    }
}
