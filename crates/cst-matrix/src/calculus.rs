//! Vector calculus helpers and matrix factories.
//!
//! `diff`, `cumsum` and `unwrap_phase` pick their working axis from the
//! input shape: the longer dimension is the one being walked. Square inputs
//! are ambiguous and rejected.

use std::f64::consts::PI;

use cst_core::{ROUND_RESULT_TO, Real, round_to};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;
use crate::range::Axis;

/// `rows x cols` matrix of zeros. A zero dimension gives the empty matrix.
pub fn zeros(rows: usize, cols: usize) -> Matrix {
    if rows == 0 || cols == 0 {
        return Matrix::empty();
    }
    Matrix::from_fn(rows, cols, |_, _| 0.0)
}

/// `n x n` identity. `eye(0)` is the empty matrix.
pub fn eye(n: usize) -> Matrix {
    Matrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
}

fn working_axis(m: &Matrix, op: &str) -> MatrixResult<Axis> {
    let (rows, cols) = m.shape();
    if m.is_empty() {
        return Err(MatrixError::shape(format!("{op}: empty input")));
    }
    match rows.cmp(&cols) {
        std::cmp::Ordering::Greater => Ok(Axis::Rows),
        std::cmp::Ordering::Less => Ok(Axis::Cols),
        std::cmp::Ordering::Equal => Err(MatrixError::shape(format!(
            "{op}: cannot determine the dimension to operate on for a {rows}x{cols} input"
        ))),
    }
}

fn diff_along(m: &Matrix, axis: Axis) -> MatrixResult<Matrix> {
    let (head, tail) = match axis {
        Axis::Rows => (m.sub2d_mat(":", -1, ":", ""), m.sub2d_mat(1, ":", ":", "")),
        Axis::Cols => (m.sub2d_mat(":", "", ":", -1), m.sub2d_mat(":", "", 1, ":")),
    };
    tail?.sub(&head?)
}

fn cumsum_along(m: &Matrix, axis: Axis) -> Matrix {
    let mut out = m.as_dmatrix().clone();
    match axis {
        Axis::Rows => {
            for i in 1..out.nrows() {
                for j in 0..out.ncols() {
                    out[(i, j)] += out[(i - 1, j)];
                }
            }
        }
        Axis::Cols => {
            for j in 1..out.ncols() {
                for i in 0..out.nrows() {
                    out[(i, j)] += out[(i, j - 1)];
                }
            }
        }
    }
    Matrix::from_dmatrix(out)
}

/// First difference `V[1:] - V[:-1]` along the longer dimension.
pub fn diff(v: impl Into<Matrix>) -> MatrixResult<Matrix> {
    let v = v.into();
    let axis = working_axis(&v, "diff")?;
    diff_along(&v, axis)
}

/// Running sum along the longer dimension.
pub fn cumsum(v: impl Into<Matrix>) -> MatrixResult<Matrix> {
    let v = v.into();
    let axis = working_axis(&v, "cumsum")?;
    Ok(cumsum_along(&v, axis))
}

/// Wrap a phase step into `(-period/2, period/2]`.
fn wrap_step(delta: Real, period: Real) -> Real {
    let half = period / 2.0;
    let wrapped = (delta + half).rem_euclid(period) - half;
    if wrapped == -half {
        half
    } else {
        wrapped
    }
}

/// Remove jumps larger than half a period from a phase vector (radians by
/// default, `period = 2π`).
///
/// The first sample is kept as is; the output has the input's orientation.
pub fn unwrap_phase(phase: impl Into<Matrix>, period: Option<Real>) -> MatrixResult<Matrix> {
    let phase = phase.into();
    if phase.is_empty() || phase.len() == 1 {
        return Ok(phase);
    }
    if !phase.is_vector() {
        return Err(MatrixError::shape("unwrap_phase: only vectors are supported"));
    }
    let period = period.unwrap_or(2.0 * PI);
    if !(period.is_finite() && period > 0.0) {
        return Err(MatrixError::InvalidArg {
            what: "unwrap period must be positive and finite",
        });
    }

    let row = phase.to_row();
    let dang = diff_along(&row, Axis::Cols)?;
    let dangd = dang.map(|d| wrap_step(d, period));
    let corr = cumsum_along(&dangd.sub(&dang)?, Axis::Cols);
    let unwrapped =
        Matrix::scalar(row[(0, 0)]).hcat(&row.sub2d_mat(":", "", 1, ":")?.add(&corr)?)?;

    if phase.nrows() > phase.ncols() {
        Ok(unwrapped.to_column())
    } else {
        Ok(unwrapped)
    }
}

/// Longest sequence [`colon`] will build.
pub const MAX_COLON_LEN: usize = 1 << 24;

/// Inclusive arithmetic sequence `start, start + step, ..., end` as a row
/// vector, each value rounded to [`ROUND_RESULT_TO`] decimals.
///
/// A zero step, or one pointing away from `end`, yields an empty row. A
/// sequence longer than [`MAX_COLON_LEN`] is rejected with `InvalidArg`.
pub fn colon(start: Real, step: Real, end: Real) -> MatrixResult<Matrix> {
    if !(start.is_finite() && step.is_finite() && end.is_finite()) || step == 0.0 {
        return Ok(Matrix::row_vector(&[]));
    }
    let span = end - start;
    if span != 0.0 && span.signum() != step.signum() {
        return Ok(Matrix::row_vector(&[]));
    }
    // Absorb representation error so that e.g. colon(0, 0.1, 1) reaches 1.
    let ratio = span / step;
    let steps = (ratio + 1e-9 * ratio.abs().max(1.0)).floor();
    if !steps.is_finite() || steps >= MAX_COLON_LEN as Real {
        return Err(MatrixError::InvalidArg {
            what: "colon: sequence is too long",
        });
    }
    let count = steps as usize + 1;
    let values: Vec<Real> = (0..count)
        .map(|k| round_to(start + k as Real * step, ROUND_RESULT_TO))
        .collect();
    Ok(Matrix::row_vector(&values))
}

/// `n` points `10^(lo + k*step)` with `step = (hi - lo)/(n - 1)`, as a row.
pub fn logspace(lo: Real, hi: Real, n: usize) -> Matrix {
    let exponents = linspace(lo, hi, n);
    exponents.map(|e| 10f64.powf(e))
}

/// `n` evenly spaced points from `lo` to `hi` inclusive, as a row.
pub fn linspace(lo: Real, hi: Real, n: usize) -> Matrix {
    match n {
        0 => Matrix::row_vector(&[]),
        1 => Matrix::row_vector(&[lo]),
        _ => {
            let step = (hi - lo) / (n - 1) as Real;
            let values: Vec<Real> = (0..n).map(|k| lo + step * k as Real).collect();
            Matrix::row_vector(&values)
        }
    }
}

/// Full discrete convolution, i.e. the product of two polynomials given by
/// their coefficients.
pub fn conv(p: &[Real], q: &[Real]) -> Vec<Real> {
    if p.is_empty() || q.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, &pi) in p.iter().enumerate() {
        for (j, &qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}
