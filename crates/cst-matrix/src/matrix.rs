//! Dense real matrix value type.
//!
//! [`Matrix`] is a thin value wrapper around `nalgebra::DMatrix<f64>` that
//! keeps the kernel's conventions in one place:
//! - construction from row lists validates that rows are not ragged
//! - scalars, flat vectors and 1-row/1-column matrices are interchangeable
//!   inputs (`From<f64>`, `From<Vec<f64>>` build 1x1 and 1xN matrices)
//! - every operation returns a new matrix

use std::fmt;

use cst_core::{Real, Tolerances, nearly_equal};
use nalgebra::DMatrix;

use crate::error::{MatrixError, MatrixResult};

/// Rectangular array of real numbers, indexed `(row, col)` from zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct Matrix {
    data: DMatrix<Real>,
}

impl Matrix {
    /// The 0x0 matrix.
    pub fn empty() -> Self {
        Self {
            data: DMatrix::zeros(0, 0),
        }
    }

    /// Build from a list of rows.
    ///
    /// Fails with [`MatrixError::Shape`] if the rows differ in length.
    pub fn from_rows<R: AsRef<[Real]>>(rows: &[R]) -> MatrixResult<Self> {
        let num_rows = rows.len();
        if num_rows == 0 {
            return Ok(Self::empty());
        }
        let num_cols = rows[0].as_ref().len();
        for (k, row) in rows.iter().enumerate() {
            if row.as_ref().len() != num_cols {
                return Err(MatrixError::shape(format!(
                    "inconsistent matrix dimensions at row {}",
                    k + 1
                )));
            }
        }
        let flat: Vec<Real> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        Ok(Self {
            data: DMatrix::from_row_slice(num_rows, num_cols, &flat),
        })
    }

    /// 1xN matrix.
    pub fn row_vector(values: &[Real]) -> Self {
        Self {
            data: DMatrix::from_row_slice(1, values.len(), values),
        }
    }

    /// Nx1 matrix.
    pub fn column_vector(values: &[Real]) -> Self {
        Self {
            data: DMatrix::from_column_slice(values.len(), 1, values),
        }
    }

    /// 1x1 matrix.
    pub fn scalar(value: Real) -> Self {
        Self {
            data: DMatrix::from_element(1, 1, value),
        }
    }

    /// Build element-wise from `f(row, col)`.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: FnMut(usize, usize) -> Real,
    {
        Self {
            data: DMatrix::from_fn(rows, cols, f),
        }
    }

    pub fn from_dmatrix(data: DMatrix<Real>) -> Self {
        Self { data }
    }

    pub fn as_dmatrix(&self) -> &DMatrix<Real> {
        &self.data
    }

    pub fn into_dmatrix(self) -> DMatrix<Real> {
        self.data
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for 1xN and Nx1 matrices.
    pub fn is_vector(&self) -> bool {
        !self.is_empty() && (self.nrows() == 1 || self.ncols() == 1)
    }

    pub fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Real> {
        self.data.get((row, col)).copied()
    }

    /// Copy of one row.
    pub fn row(&self, row: usize) -> Vec<Real> {
        self.data.row(row).iter().copied().collect()
    }

    /// Row-major list of rows.
    pub fn to_rows(&self) -> Vec<Vec<Real>> {
        (0..self.nrows()).map(|i| self.row(i)).collect()
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Real> + '_ {
        let cols = self.ncols();
        (0..self.nrows()).flat_map(move |i| (0..cols).map(move |j| self.data[(i, j)]))
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.shape() == other.shape()
    }

    pub fn ensure_same_shape(&self, other: &Matrix) -> MatrixResult<()> {
        if self.same_shape(other) {
            Ok(())
        } else {
            let (r1, c1) = self.shape();
            let (r2, c2) = other.shape();
            Err(MatrixError::shape(format!(
                "operand shapes differ ({r1}x{c1} vs {r2}x{c2})"
            )))
        }
    }

    pub fn ensure_square(&self) -> MatrixResult<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(MatrixError::NotSquare {
                rows: self.nrows(),
                cols: self.ncols(),
            })
        }
    }

    pub fn add(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.ensure_same_shape(other)?;
        Ok(Self::from_dmatrix(&self.data + &other.data))
    }

    pub fn sub(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.ensure_same_shape(other)?;
        Ok(Self::from_dmatrix(&self.data - &other.data))
    }

    /// Matrix product `self * other`.
    pub fn matmul(&self, other: &Matrix) -> MatrixResult<Matrix> {
        if self.ncols() != other.nrows() {
            let (r1, c1) = self.shape();
            let (r2, c2) = other.shape();
            return Err(MatrixError::shape(format!(
                "cannot multiply {r1}x{c1} by {r2}x{c2}"
            )));
        }
        Ok(Self::from_dmatrix(&self.data * &other.data))
    }

    pub fn scale(&self, factor: Real) -> Matrix {
        Self::from_dmatrix(&self.data * factor)
    }

    pub fn map<F: FnMut(Real) -> Real>(&self, f: F) -> Matrix {
        Self::from_dmatrix(self.data.map(f))
    }

    pub fn transpose(&self) -> Matrix {
        Self::from_dmatrix(self.data.transpose())
    }

    /// Place `other` to the right of `self`. Empty operands are skipped.
    pub fn hcat(&self, other: &Matrix) -> MatrixResult<Matrix> {
        if other.is_empty() && other.nrows() == 0 {
            return Ok(self.clone());
        }
        if self.is_empty() && self.nrows() == 0 {
            return Ok(other.clone());
        }
        if self.nrows() != other.nrows() {
            return Err(MatrixError::shape(format!(
                "cannot concatenate horizontally: {} rows vs {} rows",
                self.nrows(),
                other.nrows()
            )));
        }
        let left = self.ncols();
        Ok(Self::from_fn(self.nrows(), left + other.ncols(), |i, j| {
            if j < left {
                self.data[(i, j)]
            } else {
                other.data[(i, j - left)]
            }
        }))
    }

    /// Place `other` below `self`. Empty operands are skipped.
    pub fn vcat(&self, other: &Matrix) -> MatrixResult<Matrix> {
        if other.is_empty() && other.ncols() == 0 {
            return Ok(self.clone());
        }
        if self.is_empty() && self.ncols() == 0 {
            return Ok(other.clone());
        }
        if self.ncols() != other.ncols() {
            return Err(MatrixError::shape(format!(
                "cannot concatenate vertically: {} columns vs {} columns",
                self.ncols(),
                other.ncols()
            )));
        }
        let top = self.nrows();
        Ok(Self::from_fn(top + other.nrows(), self.ncols(), |i, j| {
            if i < top {
                self.data[(i, j)]
            } else {
                other.data[(i - top, j)]
            }
        }))
    }

    /// Reshape the elements (row-major order) into a single column.
    pub fn to_column(&self) -> Matrix {
        let values: Vec<Real> = self.iter().collect();
        Self::column_vector(&values)
    }

    /// Reshape the elements (row-major order) into a single row.
    pub fn to_row(&self) -> Matrix {
        let values: Vec<Real> = self.iter().collect();
        Self::row_vector(&values)
    }

    /// Element-wise comparison with [`nearly_equal`].
    pub fn approx_eq(&self, other: &Matrix, tol: Tolerances) -> bool {
        self.same_shape(other)
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| nearly_equal(a, b, tol))
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = Real;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[index]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.nrows() {
            if i > 0 {
                write!(f, "; ")?;
            }
            for j in 0..self.ncols() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[(i, j)])?;
            }
        }
        write!(f, "]")
    }
}

impl From<Real> for Matrix {
    fn from(value: Real) -> Self {
        Self::scalar(value)
    }
}

impl From<Vec<Real>> for Matrix {
    fn from(values: Vec<Real>) -> Self {
        Self::row_vector(&values)
    }
}

impl From<&[Real]> for Matrix {
    fn from(values: &[Real]) -> Self {
        Self::row_vector(values)
    }
}

impl From<&Matrix> for Matrix {
    fn from(m: &Matrix) -> Self {
        m.clone()
    }
}

impl From<DMatrix<Real>> for Matrix {
    fn from(data: DMatrix<Real>) -> Self {
        Self { data }
    }
}

impl TryFrom<Vec<Vec<Real>>> for Matrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<Real>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Matrix> for Vec<Vec<Real>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}
