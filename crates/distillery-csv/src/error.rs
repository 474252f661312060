//! Error types for CSV import parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a file from being parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// The file could not be opened or read.
    #[error("failed to read CSV file at '{path}': {message}")]
    Io {
        /// Path to the CSV file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The header row could not be read.
    #[error("invalid CSV header: {message}")]
    Header {
        /// Description of the header error.
        message: String,
    },

    /// A required column is absent from the header row.
    #[error("CSV header is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },
}

/// A single record that was rejected while the rest of the file was kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The record could not be decoded into the expected shape.
    #[error("line {line}: malformed record: {message}")]
    Malformed {
        /// One-based line number in the source file.
        line: u64,
        /// Description of the decoding failure.
        message: String,
    },

    /// A required value is blank.
    #[error("line {line}: '{field}' must not be empty")]
    EmptyField {
        /// One-based line number in the source file.
        line: u64,
        /// Column name.
        field: &'static str,
    },

    /// A coordinate is not a finite number.
    #[error("line {line}: '{field}' is not a valid number: {value}")]
    InvalidCoordinate {
        /// One-based line number in the source file.
        line: u64,
        /// Column name.
        field: &'static str,
        /// The raw value found in the file.
        value: String,
    },

    /// A coordinate lies outside WGS84 bounds.
    #[error("line {line}: '{field}' must be within [{min}, {max}], found {value}")]
    CoordinateOutOfRange {
        /// One-based line number in the source file.
        line: u64,
        /// Column name.
        field: &'static str,
        /// The raw value found in the file.
        value: String,
        /// Lower bound.
        min: i16,
        /// Upper bound.
        max: i16,
    },
}

impl RowError {
    /// Line number the rejected record started on.
    #[must_use]
    pub const fn line(&self) -> u64 {
        match self {
            Self::Malformed { line, .. }
            | Self::EmptyField { line, .. }
            | Self::InvalidCoordinate { line, .. }
            | Self::CoordinateOutOfRange { line, .. } => *line,
        }
    }
}
