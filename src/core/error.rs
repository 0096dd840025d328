//! Error types for the logger pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error (configuration files)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Ring buffer cannot grow past its ceiling
    #[error("Ring buffer capacity exceeded: maximum is {max} entries")]
    CapacityExceeded { max: usize },

    /// Dequeue on an empty ring buffer
    #[error("Ring buffer is empty")]
    BufferEmpty,

    /// Registry already shut down
    #[error("Logger registry already stopped")]
    LoggerStopped,

    /// Scheduler thread started twice
    #[error("Logger scheduler is already running")]
    SchedulerAlreadyRunning,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Flush attempted while the sink has no open output
    #[error("Sink '{sink}' has no open output")]
    SinkClosed { sink: String },

    /// Several sinks failed during one fan-out call
    #[error("{} sinks failed: {}", .0.len(), join_errors(.0))]
    SinkFailures(Vec<LoggerError>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a capacity exceeded error
    pub fn capacity_exceeded(max: usize) -> Self {
        LoggerError::CapacityExceeded { max }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a sink closed error
    pub fn sink_closed(sink: impl Into<String>) -> Self {
        LoggerError::SinkClosed { sink: sink.into() }
    }

    /// Fold per-sink failures collected during a fan-out into one result
    ///
    /// No failures yields `Ok(())`, a single failure is returned as-is and
    /// several are wrapped in [`LoggerError::SinkFailures`].
    pub fn collect(mut errors: Vec<LoggerError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoggerError::SinkFailures(errors)),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::capacity_exceeded(1024);
        assert!(matches!(err, LoggerError::CapacityExceeded { max: 1024 }));

        let err = LoggerError::config("LoggingConfig", "max_queue_size must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_sink("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileSinkError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::capacity_exceeded(16);
        assert_eq!(
            err.to_string(),
            "Ring buffer capacity exceeded: maximum is 16 entries"
        );

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::sink_closed("file:Foo");
        assert_eq!(err.to_string(), "Sink 'file:Foo' has no open output");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }

    #[test]
    fn test_collect_errors() {
        assert!(LoggerError::collect(Vec::new()).is_ok());

        let single = LoggerError::collect(vec![LoggerError::BufferEmpty]);
        assert!(matches!(single, Err(LoggerError::BufferEmpty)));

        let many = LoggerError::collect(vec![
            LoggerError::BufferEmpty,
            LoggerError::sink_closed("file:Foo"),
        ])
        .unwrap_err();
        assert!(matches!(many, LoggerError::SinkFailures(ref errs) if errs.len() == 2));
        assert!(many.to_string().starts_with("2 sinks failed"));
    }
}
