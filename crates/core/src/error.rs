//! Error types for cavescan

use std::fmt;

use thiserror::Error;

/// Main error type for cavescan operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({x}, {y}) in grid of size {width}x{height}")]
    IndexOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("{layer} layer has {actual} cells, expected {expected}")]
    SizeMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{} row task(s) failed: {}", .failures.len(), summarize(.failures))]
    WorkerFailure { failures: Vec<RowFailure> },

    #[error("Cancelled after {completed} of {total} rows")]
    Cancelled { completed: usize, total: usize },

    #[error("Malformed grid file: {0}")]
    Format(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`]
    pub fn invalid_parameter(
        name: &'static str,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single row task that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Row index the task was scheduled for
    pub row: usize,
    /// Error or panic message raised by the task
    pub message: String,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

fn summarize(failures: &[RowFailure]) -> String {
    match failures {
        [] => String::from("no details"),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

/// Result type alias for cavescan operations
pub type Result<T> = std::result::Result<T, Error>;
