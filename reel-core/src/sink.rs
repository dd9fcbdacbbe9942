//! Progress log sink
//!
//! Components narrate their progress by writing [`LogEntry`] values to a sink
//! handed to them at construction time. The orchestrator's log bus is one
//! implementation; the CLI prints to stdout; tests use [`NullSink`] or a
//! collecting sink.

use crate::domain::log::{LogEntry, LogLevel};

/// Destination for progress narration
///
/// Implementations must never block for long and must swallow their own
/// delivery failures.
pub trait LogSink: Send + Sync {
    /// Adds a log entry
    fn publish(&self, entry: LogEntry);

    /// Logs a debug message
    fn debug(&self, message: String) {
        self.publish(LogEntry::new(LogLevel::Debug, message));
    }

    /// Logs an info message
    fn info(&self, message: String) {
        self.publish(LogEntry::new(LogLevel::Info, message));
    }

    /// Logs a warning message
    fn warning(&self, message: String) {
        self.publish(LogEntry::new(LogLevel::Warning, message));
    }

    /// Logs an error message
    fn error(&self, message: String) {
        self.publish(LogEntry::new(LogLevel::Error, message));
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn publish(&self, _entry: LogEntry) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collecting(Mutex<Vec<LogEntry>>);

    impl LogSink for Collecting {
        fn publish(&self, entry: LogEntry) {
            self.0.lock().unwrap().push(entry);
        }
    }

    #[test]
    fn test_helpers_set_level() {
        let sink = Collecting::default();
        sink.info("one".to_string());
        sink.warning("two".to_string());
        sink.error("three".to_string());

        let entries = sink.0.lock().unwrap();
        let levels: Vec<LogLevel> = entries.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Info, LogLevel::Warning, LogLevel::Error]
        );
        assert_eq!(entries[1].message, "two");
    }
}
