//! Logging macros
//!
//! Context values accept anything implementing `Display`. Nothing is
//! formatted unless a global logger is installed and accepts the level.

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Error) {
            $crate::logging::emit(
                $crate::logging::LogEvent::error($code, $message),
                None,
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };
}

/// Warnings carry a code and optionally the source line they refer to
#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr, line = $line:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Warning) {
            $crate::logging::emit(
                $crate::logging::LogEvent::warning_with_code($code, $message),
                Some($line),
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Warning) {
            $crate::logging::emit(
                $crate::logging::LogEvent::warning_with_code($code, $message),
                None,
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Info) {
            $crate::logging::emit(
                $crate::logging::LogEvent::success($code, $message),
                None,
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Info) {
            $crate::logging::emit(
                $crate::logging::LogEvent::info($message),
                None,
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Debug) {
            $crate::logging::emit(
                $crate::logging::LogEvent::debug($message),
                None,
                vec![$(($key, ::std::format!("{}", $value))),*],
            )
        }
    };
}
