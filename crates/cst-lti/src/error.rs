//! Error types for LTI model operations.

use cst_core::CoreError;
use cst_matrix::MatrixError;
use thiserror::Error;

/// Result type for LTI model operations.
pub type LtiResult<T> = Result<T, LtiError>;

/// Errors that can occur when building, converting or evaluating models.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LtiError {
    /// Numerator has more coefficients than the denominator.
    #[error(
        "Cannot convert improper transfer function to state space \
         (numerator has {num_len} coefficients, denominator {den_len})"
    )]
    ImproperTransferFunction { num_len: usize, den_len: usize },

    /// Unknown value for an enumerated option.
    #[error("Invalid option for {option}: \"{value}\"")]
    InvalidOption { option: &'static str, value: String },

    /// Sizes of related inputs disagree.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Time samples are not evenly spaced.
    #[error("Time grid is not uniform at sample {index}: step {actual_dt}, expected {expected_dt}")]
    NonUniformTimeGrid {
        index: usize,
        expected_dt: f64,
        actual_dt: f64,
    },

    /// Invalid argument provided to a model function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A linear solve hit a singular matrix.
    #[error("Singular matrix: {what}")]
    Singular { what: &'static str },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
