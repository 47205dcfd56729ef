/// Structured logging for the warning hotspot service
///
/// Provides context-rich logging with layer identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging for scheduled batch runs.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// NWS watches/warnings feature layers
    Warnings,
    /// US drought intensity layer
    Drought,
    Cluster,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Warnings => write!(f, "NWS"),
            DataSource::Drought => write!(f, "USDM"),
            DataSource::Cluster => write!(f, "DBSCAN"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - layer retired or query rejected for a known reason
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: &DataSource, layer: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let layer_part = layer.map(|l| format!(" [layer {}]", l)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, layer_part, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, layer_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, layer_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", source, layer_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, source: DataSource, layer: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, layer, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, layer: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, layer, message);
}

/// Log a warning message
pub fn warn(source: DataSource, layer: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, layer, message);
}

/// Log an error message
pub fn error(source: DataSource, layer: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, layer, message);
}

/// Log a debug message
pub fn debug(source: DataSource, layer: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, layer, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a layer query failure.
///
/// 400/404 usually mean a retired layer or a rejected filter, which the
/// operator already knows about; server errors, timeouts and unreadable
/// bodies point at the service itself.
pub fn classify_layer_failure(err: &FetchError) -> FailureType {
    match err {
        FetchError::Http(400) | FetchError::Http(404) => FailureType::Expected,
        FetchError::Http(code) if *code >= 500 => FailureType::Unexpected,
        FetchError::Http(_) => FailureType::Unknown,
        FetchError::Transport(_) | FetchError::Parse(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a layer failure with automatic classification
pub fn log_layer_failure(source: DataSource, layer: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_layer_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(layer), &message),
        FailureType::Unexpected => error(source, Some(layer), &message),
        FailureType::Unknown => warn(source, Some(layer), &message),
    }
}

// ---------------------------------------------------------------------------
// Ingest Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a multi-layer ingest pass
pub fn log_ingest_summary(source: DataSource, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Ingest complete: {}/{} layers successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(source, None, &message);
    } else if successful == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}
