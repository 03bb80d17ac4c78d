//! Logging service and logger backends

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::constants::compile_time::logging::MEMORY_LOGGER_CAPACITY;
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front of a logger backend
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
    include_file_context: bool,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            logger,
            min_level,
            include_file_context: true,
        }
    }

    /// Build the backend described by the preferences
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let min_level = preferences.min_log_level;
        let logger: Arc<dyn Logger> = if !preferences.enable_console_logging {
            Arc::new(NullLogger)
        } else if preferences.use_structured_logging {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };

        Self {
            logger,
            min_level,
            include_file_context: preferences.include_file_context,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn includes_file_context(&self) -> bool {
        self.include_file_context
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        self.min_level.allows(level)
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }
}

/// Human readable events on stderr. Stdout is reserved for token output.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format());
    }
}

/// One JSON object per line on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Discards everything
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Bounded in-memory logger for tests
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(MEMORY_LOGGER_CAPACITY)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_event_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        if events.len() >= MEMORY_LOGGER_CAPACITY {
            events.remove(0);
        }
        events.push(event.clone());
    }
}
