//! Error type for the command-line front end.

use std::path::PathBuf;

use cst_lti::LtiError;
use cst_matrix::MatrixError;

/// Wraps errors from the kernel crates plus argument and output failures.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Could not parse \"{input}\": {reason}")]
    Parse { input: String, reason: String },

    #[error("Model error: {0}")]
    Lti(#[from] LtiError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type CliResult<T> = Result<T, CliError>;
