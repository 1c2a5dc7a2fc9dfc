//! Observer domain - leveled, structured repository events

mod event;
mod logger;

pub use event::{render_template, ContextValue, LogContext, LogLevel};
pub use logger::{NullLogger, RepositoryLogger};

#[cfg(test)]
pub use logger::mock::{LogRecord, RecordingLogger};
