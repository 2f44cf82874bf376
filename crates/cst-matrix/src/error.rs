//! Error types for matrix, slicing and eigenvalue operations.

use cst_core::CoreError;
use thiserror::Error;

use crate::range::Axis;

/// Result type for matrix operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Errors that can occur in matrix operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    /// Ragged rows or incompatible operand dimensions.
    #[error("Shape error: {what}")]
    Shape { what: String },

    /// Slice descriptor could not be parsed.
    #[error("Invalid range descriptor \"{descriptor}\": {reason}")]
    RangeSyntax { descriptor: String, reason: String },

    /// Resolved slice bound lies outside the indexed axis.
    #[error("Range index {index} out of bounds for {axis} of length {len}")]
    RangeBounds { axis: Axis, index: i64, len: usize },

    /// Operation requires a square matrix.
    #[error("Matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },

    /// Invalid argument provided to a matrix function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MatrixError {
    pub(crate) fn shape(what: impl Into<String>) -> Self {
        Self::Shape { what: what.into() }
    }

    pub(crate) fn range_syntax(descriptor: &str, reason: impl Into<String>) -> Self {
        Self::RangeSyntax {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }
}
