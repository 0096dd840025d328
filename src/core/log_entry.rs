//! Log entry structure and the on-disk line format

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt::Write as _;
use std::panic::Location;

/// strftime pattern of the timestamp column
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// strftime pattern of the date embedded in file names
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// File name of the log file for `name` on `day`: `<name>_<yyyy-MM-dd>.log`
pub fn period_file_name(name: &str, day: NaiveDate) -> String {
    format!("{}_{}.log", name, day.format(FILE_DATE_FORMAT))
}

/// Check that `name` can be used as the stem of a file inside the log
/// directory: non-empty, no path separators, no `..` and no NUL
pub fn validate_file_stem(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.chars().any(|c| std::path::is_separator(c) || c == '/' || c == '\\') {
        Some("must not contain path separators")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(LoggerError::config(
            "file sink name",
            format!("'{}' {}", name.escape_debug(), reason),
        )),
        None => Ok(()),
    }
}

/// Where a log call was issued from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerLocation {
    pub member: String,
    pub file: String,
    pub line: u32,
}

impl CallerLocation {
    pub fn new(member: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            member: member.into(),
            file: file.into(),
            line,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function.
    ///
    /// Rust has no notion of the calling member here, so `member` stays empty.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            member: String::new(),
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

impl From<&Location<'_>> for CallerLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new("", location.file(), location.line())
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub name: String,
    pub level: LogLevel,
    pub message: String,
    pub location: CallerLocation,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so that one call always produces exactly one line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(
        name: impl Into<String>,
        level: LogLevel,
        message: &str,
        location: CallerLocation,
    ) -> Self {
        Self::at(Local::now(), name, level, message, location)
    }

    /// Entry stamped with `timestamp` instead of the current local time
    pub fn at(
        timestamp: DateTime<Local>,
        name: impl Into<String>,
        level: LogLevel,
        message: &str,
        location: CallerLocation,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            level,
            message: Self::sanitize_message(message),
            location,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Render the entry into its single-line form:
    ///
    /// `<yyyy-MM-dd HH:mm:ss>|<name>|<Level> [<member>|<file>:<line>] <message>`
    pub fn render(&self) -> String {
        let mut line = String::with_capacity(
            32 + self.name.len()
                + self.location.member.len()
                + self.location.file.len()
                + self.message.len(),
        );
        // Writing into a String cannot fail
        let _ = write!(
            line,
            "{}|{}|{} [{}|{}:{}] {}",
            self.timestamp.format(LINE_TIMESTAMP_FORMAT),
            self.name,
            self.level,
            self.location.member,
            self.location.file,
            self.location.line,
            self.message
        );
        line
    }
}

/// Render an error and its whole `source()` chain as one message
pub fn error_chain_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
