use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Injected logging collaborator. The engine reports non-fatal situations
/// through it; mapping never depends on what the implementation does.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, context: &[(&str, String)]);
}

pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str, _context: &[(&str, String)]) {}
}

/// Forwards engine events to the `tracing` ecosystem.
#[derive(Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &[(&str, String)]) {
        match level {
            LogLevel::Debug => tracing::debug!(context = ?context, "{message}"),
            LogLevel::Info => tracing::info!(context = ?context, "{message}"),
            LogLevel::Warn => tracing::warn!(context = ?context, "{message}"),
            LogLevel::Error => tracing::error!(context = ?context, "{message}"),
        }
    }
}
