use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Timestamp layout of every log line, microsecond precision with offset
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f %:z";

/// Log levels in order of increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Path to log file
    pub log_file: PathBuf,
    /// Minimum log level to record
    pub min_level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            log_file: PathBuf::from("asciicam.log"),
            min_level: LogLevel::Info,
        }
    }
}

impl LoggerConfig {
    pub fn with_file_name(file_name: impl Into<PathBuf>) -> Self {
        LoggerConfig {
            log_file: file_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("a global logger is already installed: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Local wall-clock timestamps rendered with [`TIMESTAMP_FORMAT`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let timestamp: DateTime<Local> = Local::now();
        write!(w, "{}", timestamp.format(TIMESTAMP_FORMAT))
    }
}

/// Build a subscriber that appends to the configured log file.
///
/// The terminal is owned by the video output, so nothing is ever written to
/// stdout or stderr from here.
pub fn subscriber(
    config: &LoggerConfig,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, LoggerError> {
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    Ok(tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_target(false)
        .with_max_level(LevelFilter::from(config.min_level))
        .finish())
}

/// Install the file logger as the process-wide `tracing` subscriber
pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    tracing::subscriber::set_global_default(subscriber(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info, warn};

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn writes_timestamped_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfig::with_file_name(dir.path().join("test.log"));
        let subscriber = subscriber(&config).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            debug!("below the threshold");
            info!(frames = 3, "capture started");
            warn!("slow frame");
        });

        let contents = std::fs::read_to_string(&config.log_file).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("capture started"));
        assert!(lines[0].contains("frames=3"));
        assert!(lines[1].contains("WARN"));
        // "YYYY-MM-DD HH:MM:SS.ffffff"
        let stamp = &lines[0][..26];
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[19..20], ".");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfig::with_file_name(dir.path().join("no/such/dir/x.log"));
        assert!(matches!(subscriber(&config), Err(LoggerError::Io(_))));
    }
}
