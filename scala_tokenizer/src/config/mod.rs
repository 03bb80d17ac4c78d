//! Configuration for the Scala tokenizer
//!
//! Fixed limits live in [`constants`]; user-tunable preferences live in
//! [`runtime`] and can come from the environment or a TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    parse_log_level, BatchPreferences, ConfigError, FileProcessorPreferences, LexicalPreferences,
    LogLevel, LoggingPreferences, RuntimePreferences,
};
