//! Global logging for the tokenizer
//!
//! A single process-wide [`LoggingService`] is installed once by the binary
//! (or a test). Library code logs through the macros, which are no-ops
//! until a service exists. Batch workers tag their events with the file
//! they are working on through a thread-local file context.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

use crate::config::runtime::LoggingPreferences;
use crate::log_success;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the global logging service built from environment preferences
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with(&LoggingPreferences::default())
}

pub fn init_global_logging_with(preferences: &LoggingPreferences) -> Result<(), String> {
    init_global_logging_with_service(Arc::new(LoggingService::from_preferences(preferences)))?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::file_processing::FILE_NOT_FOUND,
        codes::lexical::UNTERMINATED_STRING,
        codes::success::TOKENIZATION_COMPLETE,
    ] {
        if !codes::is_registered(code.as_str()) {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
        "min_level" => preferences.min_log_level
    );
    Ok(())
}

/// Install a caller-built service (used by tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: &str) {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(file_path.to_string()));
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` with the current thread's file context set to `file_path`
pub fn with_file_context<F, R>(file_path: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_file_context();
    set_file_context(file_path);
    let result = f();
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn get_current_file_context() -> Option<String> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Whether an event at `level` would reach the global logger
pub fn is_enabled(level: LogLevel) -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(level))
        .unwrap_or(false)
}

/// Attach context, line and file to `event` and hand it to the global logger
pub fn emit(event: LogEvent, line: Option<u32>, context: Vec<(&str, String)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = event;
    for (key, value) in &context {
        event = event.with_context(key, value);
    }
    if let Some(line) = line {
        event = event.with_line(line);
    }
    if logger.includes_file_context() {
        if let Some(file) = get_current_file_context() {
            event = event.with_file(&file);
        }
    }

    logger.log_event(event);
}

/// Memory logger installed as the global service for the whole test run.
/// Keeps warnings and errors only.
#[cfg(test)]
pub(crate) fn test_memory_logger() -> &'static MemoryLogger {
    static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    MEMORY.get_or_init(|| {
        let memory = Arc::new(MemoryLogger::new());
        let logger: Arc<dyn Logger> = memory.clone();
        // Fails only if a test installed another service first
        let _ = init_global_logging_with_service(Arc::new(LoggingService::new(
            logger,
            LogLevel::Warning,
        )));
        memory
    })
}
