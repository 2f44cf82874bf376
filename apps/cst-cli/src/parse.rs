//! Parsing of numeric command-line arguments.
//!
//! Lists are comma separated (`1,-3,2`); matrices separate rows with `;`
//! (`0,1;-2,-3`).

use cst_matrix::Matrix;

use crate::error::{CliError, CliResult};

pub fn parse_list(input: &str) -> CliResult<Vec<f64>> {
    if input.trim().is_empty() {
        return Err(CliError::Parse {
            input: input.to_string(),
            reason: "expected at least one number".to_string(),
        });
    }
    input
        .split(',')
        .map(|token| {
            token.trim().parse::<f64>().map_err(|e| CliError::Parse {
                input: input.to_string(),
                reason: format!("\"{}\": {e}", token.trim()),
            })
        })
        .collect()
}

pub fn parse_matrix(input: &str) -> CliResult<Matrix> {
    let rows = input
        .split(';')
        .map(parse_list)
        .collect::<CliResult<Vec<_>>>()?;
    Ok(Matrix::from_rows(&rows)?)
}
