//! Tracing subscriber initialization.
//!
//! Logs are written to a file instead of the terminal the diagram is drawn
//! on. Users can monitor them via `tail -f` in a separate terminal. Warnings
//! and errors can additionally be forwarded to the viewer's status line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// A log event forwarded to the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Severity of the event.
    pub level: Level,
    /// Rendered message, with structured fields appended as `key=value`.
    pub message: String,
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Layer that sends events at or above a level through a channel.
///
/// A dropped receiver is ignored; logging never fails the caller.
pub struct StatusLayer {
    sender: Sender<StatusEntry>,
    min_level: Level,
}

impl StatusLayer {
    /// Forward `WARN` and `ERROR` events to `sender`.
    pub fn new(sender: Sender<StatusEntry>) -> Self {
        Self::with_min_level(sender, Level::WARN)
    }

    /// Forward events at `min_level` or more severe.
    pub fn with_min_level(sender: Sender<StatusEntry>, min_level: Level) -> Self {
        Self { sender, min_level }
    }
}

impl<S: Subscriber> Layer<S> for StatusLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        // tracing orders levels by verbosity: ERROR < WARN < ... < TRACE
        if level > self.min_level {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let _ = self.sender.send(StatusEntry {
            level,
            message: visitor.finish(),
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        let fields = self.fields.join(" ");
        if self.message.is_empty() {
            fields
        } else {
            format!("{} {}", self.message, fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Logs are written to a file for users to monitor with `tail -f`.
/// Respects RUST_LOG environment variable, defaults to "info" level.
///
/// Creates the log directory if it doesn't exist.
///
/// # Arguments
///
/// * `log_path` - Path to the log file
/// * `status` - Optional channel receiving warnings and errors
///
/// # Returns
/// * `Ok(())` if initialization succeeded
/// * `Err(LoggingError)` if the subscriber was already initialized or directory creation failed
pub fn init(log_path: &Path, status: Option<Sender<StatusEntry>>) -> Result<(), LoggingError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(status.map(StatusLayer::new))
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
