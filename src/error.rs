//! Centralized error handling for prepkit.
//!
//! Loading and export return [`PrepError`]; the strict validator never fails
//! and reports its findings as data instead (see
//! [`crate::analyser::logic::validation`]). Mutation operations are total and
//! have no error path at all.
//!
//! ```
//! use prepkit::error::PrepError;
//!
//! fn describe(err: &PrepError) -> &'static str {
//!     match err {
//!         PrepError::EmptyInput => "nothing to load",
//!         PrepError::UnsupportedFormat(_) => "pick a csv or spreadsheet file",
//!         _ => "load failed",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any result whose error converts into
//! [`PrepError`]:
//!
//! ```no_run
//! use prepkit::error::ResultExt as _;
//!
//! fn read_input() -> prepkit::error::Result<Vec<u8>> {
//!     std::fs::read("data.csv").context("Failed to read input")
//! }
//! ```

use std::fmt;

/// Main error type for prepkit operations.
#[derive(Debug)]
pub enum PrepError {
    /// I/O errors (file reads and writes)
    Io(std::io::Error),

    /// The source contains no non-empty lines or no worksheet rows
    EmptyInput,

    /// File extension does not select a known parse path
    UnsupportedFormat(String),

    /// Delimited text could not be decoded or written
    Parse(String),

    /// Spreadsheet binary could not be decoded
    Spreadsheet(String),

    /// Configuration or recipe errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::EmptyInput => write!(f, "Input contains no data"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {ext}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Spreadsheet(msg) => write!(f, "Spreadsheet error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PrepError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PrepError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<calamine::Error> for PrepError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<anyhow::Error> for PrepError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

// Hosts that marshal errors across a string-only boundary
impl From<PrepError> for String {
    fn from(err: PrepError) -> Self {
        err.to_string()
    }
}

/// Result type alias for prepkit operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with `msg` as a prefix.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with the closure's output as a prefix.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PrepError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: PrepError = e.into();
            PrepError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: PrepError = e.into();
            PrepError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::UnsupportedFormat("pdf".to_owned());
        assert_eq!(err.to_string(), "Unsupported file format: pdf");
        assert_eq!(PrepError::EmptyInput.to_string(), "Input contains no data");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let s: String = PrepError::EmptyInput.into();
        assert_eq!(s, "Input contains no data");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.csv",
        ));

        let result: Result<()> = result.context("Failed to read file");
        let Err(err) = result else {
            panic!("context must keep the error");
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"), "missing context: {msg}");
        assert!(msg.contains("file.csv"), "missing source message: {msg}");
    }

    #[test]
    fn test_io_error_exposes_source() {
        let err = PrepError::from(std::io::Error::other("disk"));
        assert!(std::error::Error::source(&err).is_some(), "io errors keep their source");
    }
}
