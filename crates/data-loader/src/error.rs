//! Error types for the data-loader crate.
//!
//! Every failure that can happen while reading, shaping or indexing an
//! interaction table ends up as one of these variants. Column lookups that
//! miss surface as [`DataLoadError::ColumnNotFound`] so callers can tell a
//! misconfigured column name apart from bad data.

use crate::types::DType;
use thiserror::Error;

/// Errors that can occur during data loading, table manipulation and indexing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed delimited record (bad quoting, invalid UTF-8, ...)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A named column is not present in the table
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// A column with this name already exists
    #[error("Duplicate column: {name}")]
    DuplicateColumn { name: String },

    /// A column's length differs from the table's row count
    #[error("Column {column} has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A column holds a dtype the operation cannot use
    #[error("Column {column} has dtype {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: DType,
    },

    /// Nothing to work with (e.g. building a trainset from an empty table)
    #[error("Empty data: {0}")]
    EmptyData(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
