//! Slice descriptors for extracting submatrices.
//!
//! A descriptor is a string such as `"0:,1:2"`, `":4,:"` or, for vectors, a
//! single axis like `"1:"`. Per axis:
//! - `:` takes the whole axis
//! - `a:` runs from `a` to the last index
//! - `:b` runs from 0 to `b`
//! - `a:b` is inclusive on both ends
//! - a bare `k` is the single index `k`
//!
//! Negative indices resolve to `len + k - 1`, so `-1` names the second to
//! last element. Existing callers (`diff`, the simulator's block extraction)
//! depend on this; do not change it to the NumPy convention.
//!
//! A single-axis descriptor on a vector indexes its longer dimension; on a
//! matrix it is rejected.

use std::fmt;

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

/// Matrix axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rows => write!(f, "rows"),
            Axis::Cols => write!(f, "columns"),
        }
    }
}

/// Inclusive index bounds on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// The whole axis. Fails on an empty axis.
    pub fn full(axis: Axis, len: usize) -> MatrixResult<Self> {
        if len == 0 {
            return Err(MatrixError::RangeBounds {
                axis,
                index: 0,
                len,
            });
        }
        Ok(Self {
            start: 0,
            end: len - 1,
        })
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// One half of a programmatic range: what goes on one side of a `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeArg {
    /// The range operator itself.
    Colon,
    /// Nothing; an open bound.
    Empty,
    Index(i64),
    /// Any other text, passed through to the parser.
    Token(String),
}

impl fmt::Display for RangeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeArg::Colon => write!(f, ":"),
            RangeArg::Empty => Ok(()),
            RangeArg::Index(i) => write!(f, "{i}"),
            RangeArg::Token(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RangeArg {
    fn from(s: &str) -> Self {
        match s.trim() {
            ":" => RangeArg::Colon,
            "" => RangeArg::Empty,
            t => t
                .parse::<i64>()
                .map(RangeArg::Index)
                .unwrap_or_else(|_| RangeArg::Token(t.to_string())),
        }
    }
}

impl From<String> for RangeArg {
    fn from(s: String) -> Self {
        RangeArg::from(s.as_str())
    }
}

impl From<i32> for RangeArg {
    fn from(i: i32) -> Self {
        RangeArg::Index(i as i64)
    }
}

impl From<i64> for RangeArg {
    fn from(i: i64) -> Self {
        RangeArg::Index(i)
    }
}

impl From<usize> for RangeArg {
    fn from(i: usize) -> Self {
        RangeArg::Index(i as i64)
    }
}

/// Join a start/end pair into one axis descriptor.
///
/// `(":", b)` gives `":b"`, `(a, ":")` gives `"a:"`, anything else `"a:b"`.
pub fn axis_descriptor(start: &RangeArg, end: &RangeArg) -> String {
    match (start, end) {
        (RangeArg::Colon, end) => format!(":{end}"),
        (start, RangeArg::Colon) => format!("{start}:"),
        (start, end) => format!("{start}:{end}"),
    }
}

fn parse_index(token: &str, descriptor: &str) -> MatrixResult<i64> {
    token.parse::<i64>().map_err(|_| {
        MatrixError::range_syntax(descriptor, format!("\"{token}\" is not an integer index"))
    })
}

fn resolve(index: i64, axis: Axis, len: usize) -> MatrixResult<usize> {
    let resolved = if index >= 0 {
        index
    } else {
        len as i64 + index - 1
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(MatrixError::RangeBounds { axis, index, len });
    }
    Ok(resolved as usize)
}

/// Parse one axis of a descriptor against an axis of length `len`.
pub fn parse_axis(token: &str, axis: Axis, len: usize) -> MatrixResult<Range> {
    if token.is_empty() {
        return Err(MatrixError::range_syntax(token, format!("empty {axis} range")));
    }
    let parts: Vec<&str> = token.split(':').collect();
    let (start, end) = match parts.as_slice() {
        [single] => {
            let k = resolve(parse_index(single, token)?, axis, len)?;
            (k, k)
        }
        ["", ""] => return Range::full(axis, len),
        ["", end] => (0, resolve(parse_index(end, token)?, axis, len)?),
        [start, ""] => {
            let full = Range::full(axis, len)?;
            (resolve(parse_index(start, token)?, axis, len)?, full.end)
        }
        [start, end] => (
            resolve(parse_index(start, token)?, axis, len)?,
            resolve(parse_index(end, token)?, axis, len)?,
        ),
        _ => {
            return Err(MatrixError::range_syntax(
                token,
                "at most one ':' is allowed per axis",
            ));
        }
    };
    if start > end {
        return Err(MatrixError::range_syntax(
            token,
            format!("{axis} range starts at {start} but ends at {end}"),
        ));
    }
    Ok(Range { start, end })
}

/// Resolved row and column ranges of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec {
    pub rows: Range,
    pub cols: Range,
}

impl SliceSpec {
    /// Parse a descriptor against a matrix of the given `(rows, cols)` shape.
    pub fn parse(descriptor: &str, shape: (usize, usize)) -> MatrixResult<Self> {
        let r: String = descriptor.chars().filter(|c| !c.is_whitespace()).collect();
        if r.is_empty() {
            return Err(MatrixError::range_syntax(descriptor, "empty descriptor"));
        }
        let (num_rows, num_cols) = shape;

        let full = if r.contains(',') {
            r
        } else if num_rows > 1 && num_cols > 1 {
            return Err(MatrixError::range_syntax(
                descriptor,
                "matrix supplied, but range specifies a (sub)vector",
            ));
        } else if num_rows > num_cols {
            format!("{r},:")
        } else {
            format!(":,{r}")
        };

        let axes: Vec<&str> = full.split(',').collect();
        let [rows, cols] = axes.as_slice() else {
            return Err(MatrixError::range_syntax(
                descriptor,
                "expected at most two comma-separated axes",
            ));
        };
        Ok(Self {
            rows: parse_axis(rows, Axis::Rows, num_rows)?,
            cols: parse_axis(cols, Axis::Cols, num_cols)?,
        })
    }
}

impl Matrix {
    /// Copy out the block covered by `spec`.
    pub fn extract(&self, spec: &SliceSpec) -> Matrix {
        let view = self.as_dmatrix().view(
            (spec.rows.start, spec.cols.start),
            (spec.rows.len(), spec.cols.len()),
        );
        Matrix::from_dmatrix(view.into_owned())
    }

    /// Submatrix selected by a descriptor string such as `"0:1,2:"`.
    pub fn sub2d(&self, descriptor: &str) -> MatrixResult<Matrix> {
        let spec = SliceSpec::parse(descriptor, self.shape())?;
        Ok(self.extract(&spec))
    }

    /// Programmatic single-axis form: `v.sub2d_vec(1, ":")` is `v.sub2d("1:")`.
    pub fn sub2d_vec(
        &self,
        start: impl Into<RangeArg>,
        end: impl Into<RangeArg>,
    ) -> MatrixResult<Matrix> {
        self.sub2d(&axis_descriptor(&start.into(), &end.into()))
    }

    /// Programmatic two-axis form: `(row_start, row_end, col_start, col_end)`.
    pub fn sub2d_mat(
        &self,
        row_start: impl Into<RangeArg>,
        row_end: impl Into<RangeArg>,
        col_start: impl Into<RangeArg>,
        col_end: impl Into<RangeArg>,
    ) -> MatrixResult<Matrix> {
        let descriptor = format!(
            "{},{}",
            axis_descriptor(&row_start.into(), &row_end.into()),
            axis_descriptor(&col_start.into(), &col_end.into())
        );
        self.sub2d(&descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v123() -> Matrix {
        Matrix::from(vec![1.0, 2.0, 3.0])
    }

    #[test]
    fn programmatic_vector_forms() {
        let a = v123();
        assert_eq!(a.sub2d_vec(":", "").unwrap().to_rows(), vec![vec![1.0, 2.0, 3.0]]);
        assert_eq!(a.sub2d_vec(1, ":").unwrap().to_rows(), vec![vec![2.0, 3.0]]);
        assert_eq!(a.sub2d_vec(":", 1).unwrap().to_rows(), vec![vec![1.0, 2.0]]);
        assert_eq!(a.sub2d_vec(1, 1).unwrap().to_rows(), vec![vec![2.0]]);
        assert_eq!(a.sub2d_vec(":", -1).unwrap().to_rows(), vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn axis_descriptor_joins_like_the_operator() {
        assert_eq!(axis_descriptor(&":".into(), &"".into()), ":");
        assert_eq!(axis_descriptor(&":".into(), &(-1).into()), ":-1");
        assert_eq!(axis_descriptor(&2.into(), &":".into()), "2:");
        assert_eq!(axis_descriptor(&2usize.into(), &4i64.into()), "2:4");
    }

    #[test]
    fn negative_end_counts_past_the_last_element() {
        // len + end - 1
        let r = parse_axis(":-1", Axis::Cols, 5).unwrap();
        assert_eq!(r, Range { start: 0, end: 3 });
        let r = parse_axis("1:-2", Axis::Cols, 5).unwrap();
        assert_eq!(r, Range { start: 1, end: 2 });
    }

    #[test]
    fn column_vector_is_indexed_along_rows() {
        let c = Matrix::column_vector(&[1.0, 2.0, 3.0, 4.0]);
        let s = c.sub2d("1:2").unwrap();
        assert_eq!(s.to_rows(), vec![vec![2.0], vec![3.0]]);
    }

    #[test]
    fn matrix_needs_two_axes() {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(m.sub2d("0:1"), Err(MatrixError::RangeSyntax { .. })));
        let s = m.sub2d(" 1 , : ").unwrap();
        assert_eq!(s.to_rows(), vec![vec![3.0, 4.0]]);
    }

    #[test]
    fn malformed_descriptors() {
        let a = v123();
        for bad in ["", "   ", "a:b", "1::2", "1,2,3", "x", ":,"] {
            assert!(
                matches!(a.sub2d(bad), Err(MatrixError::RangeSyntax { .. })),
                "descriptor {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let a = v123();
        assert_eq!(
            a.sub2d("0:3"),
            Err(MatrixError::RangeBounds {
                axis: Axis::Cols,
                index: 3,
                len: 3
            })
        );
        assert!(matches!(a.sub2d(":-4"), Err(MatrixError::RangeBounds { .. })));
        assert!(matches!(a.sub2d("2:1"), Err(MatrixError::RangeSyntax { .. })));
    }
}
