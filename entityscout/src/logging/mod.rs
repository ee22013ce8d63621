//! Structured logging infrastructure for EntityScout.
//!
//! Logging is built on the tracing crate; the subscriber format, level and
//! destination come from [`LoggingConfig`].


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Keeps the file writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// Calling this more than once is harmless: a subscriber that is already
/// installed is left in place.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let level = to_tracing_level(&config.level);

    let result = match config.format {
        LogFormat::Json => init_json_logging(level, config),
        LogFormat::Compact => init_compact_logging(level, config),
        LogFormat::Pretty => init_pretty_logging(level, config),
        LogFormat::Default => init_default_logging(level, config),
    };

    match result {
        // Another thread installed a subscriber between the check and ours.
        Err(LogError::SubscriberError(_)) if tracing::dispatcher::has_been_set() => Ok(()),
        Ok(()) if config.stdout && config.file.is_some() => {
            // Both destinations would need a tee layer; stdout wins.
            tracing::warn!("Configured for stdout only; file logging ignored");
            Ok(())
        }
        other => other,
    }
}

/// Writer selected by the configuration: a file when one is configured and
/// stdout is off, otherwise stdout.
fn file_writer(config: &LoggingConfig) -> Result<Option<NonBlocking>> {
    match &config.file {
        Some(path) if !config.stdout => Ok(Some(create_non_blocking_file(path)?)),
        _ => Ok(None),
    }
}

fn init_json_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_target(true)
        .with_line_number(true);

    match file_writer(config)? {
        Some(writer) => subscriber.with_writer(writer).try_init()?,
        None if config.stdout => subscriber.try_init()?,
        None => {}
    }

    Ok(())
}

fn init_compact_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_target(true)
        .with_line_number(true);

    match file_writer(config)? {
        Some(writer) => subscriber.with_writer(writer).try_init()?,
        None if config.stdout => subscriber.try_init()?,
        None => {}
    }

    Ok(())
}

fn init_pretty_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(level)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true);

    match file_writer(config)? {
        Some(writer) => subscriber.with_writer(writer).try_init()?,
        None if config.stdout => subscriber.try_init()?,
        None => {}
    }

    Ok(())
}

fn init_default_logging(level: Level, config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);

    match file_writer(config)? {
        Some(writer) => subscriber.with_writer(writer).try_init()?,
        None if config.stdout => subscriber.try_init()?,
        None => {}
    }

    Ok(())
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<NonBlocking> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name().unwrap_or_default(),
    );

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    Ok(non_blocking)
}

fn to_tracing_level(level: &LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level
        .parse::<LogLevel>()
        .map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}
