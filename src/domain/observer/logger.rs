//! Repository logger trait

use std::fmt::Debug;

use super::event::{LogContext, LogLevel};

/// Receives structured events describing repository operations
///
/// `template` contains `{name}` placeholders matching keys in `context`.
pub trait RepositoryLogger: Send + Sync + Debug {
    fn log(&self, level: LogLevel, template: &str, context: &LogContext);

    fn info(&self, template: &str, context: &LogContext) {
        self.log(LogLevel::Info, template, context);
    }

    fn warning(&self, template: &str, context: &LogContext) {
        self.log(LogLevel::Warning, template, context);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl RepositoryLogger for NullLogger {
    fn log(&self, _level: LogLevel, _template: &str, _context: &LogContext) {}
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// An event captured by [`RecordingLogger`]
    #[derive(Debug, Clone, PartialEq)]
    pub struct LogRecord {
        pub level: LogLevel,
        pub message: String,
        pub context: LogContext,
    }

    /// Logger that keeps every event in order
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        records: Mutex<Vec<LogRecord>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl RepositoryLogger for RecordingLogger {
        fn log(&self, level: LogLevel, template: &str, context: &LogContext) {
            self.records.lock().unwrap().push(LogRecord {
                level,
                message: template.to_string(),
                context: context.clone(),
            });
        }
    }

    #[test]
    fn test_recording_logger_keeps_order() {
        let logger = RecordingLogger::new();
        let context = LogContext::new().with("model", "User");

        logger.info("first {model}", &context);
        logger.warning("second {model}", &context);

        let records = logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].message, "first {model}");
        assert_eq!(records[1].level, LogLevel::Warning);
    }
}
