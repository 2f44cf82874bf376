//! State-space models.

use cst_matrix::{Eigenvalue, Matrix, MatrixError, eig};
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};

/// Continuous-time LTI system in state-space form.
///
/// ```text
/// dx/dt = A x + B u
///     y = C x + D u
/// ```
///
/// Dimensions are checked once at construction and the model is immutable
/// afterwards. A model with zero states is a static gain `y = D u`.
///
/// # Example
///
/// ```
/// use cst_lti::StateSpace;
/// use cst_matrix::Matrix;
///
/// let a = Matrix::from_rows(&[[0.0, 1.0], [-2.0, -3.0]]).unwrap();
/// let b = Matrix::column_vector(&[0.0, 1.0]);
/// let c = Matrix::row_vector(&[1.0, 0.0]);
/// let d = Matrix::scalar(0.0);
///
/// let sys = StateSpace::new(a, b, c, d).unwrap();
/// assert_eq!(sys.num_states(), 2);
/// assert!(sys.is_siso());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StateSpaceParts", into = "StateSpaceParts")]
pub struct StateSpace {
    a: Matrix,
    b: Matrix,
    c: Matrix,
    d: Matrix,
    num_states: usize,
    num_inputs: usize,
    num_outputs: usize,
}

/// Wire form: the four matrices only, sizes are derived on load.
#[derive(Serialize, Deserialize)]
struct StateSpaceParts {
    a: Matrix,
    b: Matrix,
    c: Matrix,
    d: Matrix,
}

impl TryFrom<StateSpaceParts> for StateSpace {
    type Error = LtiError;

    fn try_from(parts: StateSpaceParts) -> Result<Self, Self::Error> {
        Self::new(parts.a, parts.b, parts.c, parts.d)
    }
}

impl From<StateSpace> for StateSpaceParts {
    fn from(sys: StateSpace) -> Self {
        Self {
            a: sys.a,
            b: sys.b,
            c: sys.c,
            d: sys.d,
        }
    }
}

fn shape_error(what: String) -> LtiError {
    LtiError::Matrix(MatrixError::Shape { what })
}

impl StateSpace {
    /// Build a model from its four matrices.
    ///
    /// `A` must be n×n, `B` n×m, `C` p×n and `D` p×m. With `n = 0` the
    /// input and output counts come from `D`, and `A`, `B` and `C` may be
    /// empty.
    pub fn new(a: Matrix, b: Matrix, c: Matrix, d: Matrix) -> LtiResult<Self> {
        a.ensure_square()?;
        let n = a.nrows();
        let (p, m) = d.shape();
        if p == 0 || m == 0 {
            return Err(LtiError::InvalidArg {
                what: "feedthrough matrix D must have at least one input and one output",
            });
        }

        if n > 0 {
            if b.shape() != (n, m) {
                return Err(shape_error(format!(
                    "B must be {n}x{m} to match A and D, got {}x{}",
                    b.nrows(),
                    b.ncols()
                )));
            }
            if c.shape() != (p, n) {
                return Err(shape_error(format!(
                    "C must be {p}x{n} to match A and D, got {}x{}",
                    c.nrows(),
                    c.ncols()
                )));
            }
        } else if !b.is_empty() || !c.is_empty() {
            return Err(shape_error(
                "B and C must be empty for a system without states".to_string(),
            ));
        }

        // Normalise the zero-state case so sizes survive a serde round trip.
        let (b, c) = if n == 0 {
            (Matrix::from_fn(0, m, |_, _| 0.0), Matrix::from_fn(p, 0, |_, _| 0.0))
        } else {
            (b, c)
        };

        Ok(Self {
            a,
            b,
            c,
            d,
            num_states: n,
            num_inputs: m,
            num_outputs: p,
        })
    }

    /// Static gain `y = D u`.
    pub fn static_gain(d: Matrix) -> LtiResult<Self> {
        Self::new(Matrix::empty(), Matrix::empty(), Matrix::empty(), d)
    }

    pub fn a_mat(&self) -> &Matrix {
        &self.a
    }

    pub fn b_mat(&self) -> &Matrix {
        &self.b
    }

    pub fn c_mat(&self) -> &Matrix {
        &self.c
    }

    pub fn d_mat(&self) -> &Matrix {
        &self.d
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Single input, single output.
    pub fn is_siso(&self) -> bool {
        self.num_inputs == 1 && self.num_outputs == 1
    }

    /// Eigenvalues of `A`. Empty for a static gain.
    pub fn poles(&self) -> LtiResult<Vec<Eigenvalue>> {
        if self.num_states == 0 {
            return Ok(Vec::new());
        }
        Ok(eig(&self.a)?)
    }
}
