//! Error types for the segmentation pipeline.
//!
//! `SegmentError` covers every failure the pipeline reports on purpose. Each
//! variant belongs to one [`ErrorKind`], so callers can decide whether to abort
//! (data and configuration problems) or reprompt (input validation).
//! A key that is absent from the segment table is not an error; lookups
//! return `Option::None` for it.

use std::fmt;

use thiserror::Error;

/// Broad category of a [`SegmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value typed in during interactive entry was rejected.
    InputValidation,
    /// The loaded table cannot be aggregated as-is.
    Data,
    /// The table is valid but cannot satisfy the segmentation setup.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InputValidation => write!(f, "input validation error"),
            ErrorKind::Data => write!(f, "data error"),
            ErrorKind::Configuration => write!(f, "configuration error"),
        }
    }
}

/// Errors raised while profiling, aggregating, or classifying customers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// A required column is absent from the loaded table.
    #[error("Required column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A grouping column contains nulls.
    #[error("Column '{column}' contains {count} null value(s); grouping keys must be complete")]
    NullGroupingKey { column: String, count: usize },

    /// A cell could not be interpreted for its column.
    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    /// No record carries a price, so there is nothing to aggregate.
    #[error("No priced records to aggregate")]
    EmptyTable,

    /// Too few customer keys to fill every segment.
    #[error(
        "Only {found} distinct customer key(s); at least {required} are needed to form {required} segments"
    )]
    InsufficientKeys { found: usize, required: usize },

    /// Mean prices are so concentrated that two quantile edges coincide.
    #[error("Quantile edges {edges:?} are not unique; cannot form {bins} segments")]
    DuplicateQuantileEdges { edges: Vec<f64>, bins: usize },

    /// The oldest customer does not reach past the last fixed breakpoint.
    #[error("Maximum age {max_age} must exceed {floor} to form the top age bucket")]
    AgeCeilingTooLow { max_age: i64, floor: u32 },

    /// Interactive age was not a whole number inside the table's age range.
    #[error("Age must be a whole number between 0 and {ceiling}, got '{input}'")]
    AgeOutOfRange { input: String, ceiling: u32 },

    /// Interactive value is not one of the allowed choices.
    #[error("Unknown {field} '{input}'. Expected one of: {expected}")]
    UnknownChoice {
        field: &'static str,
        input: String,
        expected: String,
    },

    /// Interactive value was left blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

impl SegmentError {
    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SegmentError::AgeOutOfRange { .. }
            | SegmentError::UnknownChoice { .. }
            | SegmentError::EmptyField { .. } => ErrorKind::InputValidation,
            SegmentError::MissingColumn { .. }
            | SegmentError::NullGroupingKey { .. }
            | SegmentError::InvalidValue { .. }
            | SegmentError::EmptyTable => ErrorKind::Data,
            SegmentError::InsufficientKeys { .. }
            | SegmentError::DuplicateQuantileEdges { .. }
            | SegmentError::AgeCeilingTooLow { .. } => ErrorKind::Configuration,
        }
    }

    /// True when the error should abandon only the current interactive entry.
    pub fn is_input_validation(&self) -> bool {
        self.kind() == ErrorKind::InputValidation
    }
}
