use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};
use crate::domain::observer::{render_template, LogContext, LogLevel, RepositoryLogger};

/// Target of every repository event
pub const LOG_TARGET: &str = "model_repository";

pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }

    tracing::debug!("Logging initialized with level: {}", config.level);
}

/// Repository observer emitting `tracing` events
///
/// The rendered message is the event message; the raw template and the
/// context (as JSON) ride along as fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryLogger for TracingLogger {
    fn log(&self, level: LogLevel, template: &str, context: &LogContext) {
        let message = render_template(template, context);

        match level {
            LogLevel::Debug => {
                tracing::debug!(target: LOG_TARGET, template, context = %context, "{}", message)
            }
            LogLevel::Info => {
                tracing::info!(target: LOG_TARGET, template, context = %context, "{}", message)
            }
            LogLevel::Warning => {
                tracing::warn!(target: LOG_TARGET, template, context = %context, "{}", message)
            }
            LogLevel::Error => {
                tracing::error!(target: LOG_TARGET, template, context = %context, "{}", message)
            }
        }
    }
}
