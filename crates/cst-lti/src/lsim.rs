//! Time-domain simulation of LTI models on a uniform time grid.
//!
//! The continuous model is discretized once per call with Van Loan's block
//! exponential, treating the input as piecewise linear between samples.
//! The state recurrence is then
//!
//! ```text
//! x[i] = Ad x[i-1] + Bd0 u[i-1] + Bd1 u[i]
//! y    = C X + D U
//! ```

use cst_core::ensure_all_finite;
use cst_matrix::Matrix;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LtiError, LtiResult};
use crate::state_space::StateSpace;
use crate::transfer_function::TransferFunction;

/// Options for [`StateSpace::lsim_with`].
#[derive(Clone, Debug)]
pub struct LsimOptions {
    /// Reject time vectors whose steps differ from the first one.
    pub check_uniform_grid: bool,
    /// Allowed step deviation relative to the first step.
    pub grid_rel_tol: f64,
}

impl Default for LsimOptions {
    fn default() -> Self {
        Self {
            check_uniform_grid: true,
            grid_rel_tol: 1e-6,
        }
    }
}

/// Discrete-time matrices for one sample period.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
    pub dt: f64,
    pub ad: Matrix,
    pub bd0: Matrix,
    pub bd1: Matrix,
}

/// States and outputs over a time grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// One column per time point (n x steps)
    pub x: Matrix,
    /// One column per time point (p x steps)
    pub y: Matrix,
}

impl SimulationTrace {
    /// Output `k` as a flat series.
    pub fn output(&self, k: usize) -> Vec<f64> {
        self.y.row(k)
    }
}

/// Check a time vector and return its step.
fn validate_time(t: &[f64], opts: &LsimOptions) -> LtiResult<f64> {
    if t.len() < 2 {
        return Err(LtiError::InvalidArg {
            what: "time vector needs at least two samples",
        });
    }
    ensure_all_finite(t, "time sample")?;
    let dt = t[1] - t[0];
    if t.windows(2).any(|w| w[1] <= w[0]) {
        return Err(LtiError::InvalidArg {
            what: "time vector must be strictly increasing",
        });
    }
    if opts.check_uniform_grid {
        let tol = opts.grid_rel_tol * dt;
        for (i, w) in t.windows(2).enumerate().skip(1) {
            let step = w[1] - w[0];
            if (step - dt).abs() > tol {
                return Err(LtiError::NonUniformTimeGrid {
                    index: i + 1,
                    expected_dt: dt,
                    actual_dt: step,
                });
            }
        }
    }
    Ok(dt)
}

/// Arrange the input as one row per input channel and one column per sample.
fn input_matrix(u: Matrix, num_inputs: usize, steps: usize) -> LtiResult<Matrix> {
    let shape = u.shape();
    if shape == (1, 1) {
        let v = u[(0, 0)];
        return Ok(Matrix::from_fn(num_inputs, steps, |_, _| v));
    }
    if shape == (num_inputs, steps) {
        return Ok(u);
    }
    if shape == (steps, num_inputs) {
        return Ok(u.transpose());
    }
    let actual = if shape.0 == num_inputs {
        shape.1
    } else if shape.1 == num_inputs {
        shape.0
    } else {
        return Err(LtiError::DimensionMismatch {
            what: "input channels",
            expected: num_inputs,
            actual: shape.0.min(shape.1),
        });
    };
    Err(LtiError::DimensionMismatch {
        what: "input samples",
        expected: steps,
        actual,
    })
}

impl StateSpace {
    /// Discretize with step `dt`.
    ///
    /// Exponentiates the `(n + 2m)` square block matrix
    /// `[[A dt, B dt, 0], [0, 0, I], [0, 0, 0]]` and reads `Ad`, `Bd0`
    /// and `Bd1` out of its top block row.
    pub fn discretize(&self, dt: f64) -> LtiResult<Discretization> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(LtiError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }
        let n = self.num_states();
        let m = self.num_inputs();
        if n == 0 {
            return Ok(Discretization {
                dt,
                ad: Matrix::empty(),
                bd0: Matrix::from_fn(0, m, |_, _| 0.0),
                bd1: Matrix::from_fn(0, m, |_, _| 0.0),
            });
        }

        let (a, b) = (self.a_mat(), self.b_mat());
        let size = n + 2 * m;
        let block = Matrix::from_fn(size, size, |i, j| {
            if i < n && j < n {
                a[(i, j)] * dt
            } else if i < n && j < n + m {
                b[(i, j - n)] * dt
            } else if i >= n && i < n + m && j == i + m {
                1.0
            } else {
                0.0
            }
        });
        let expm = Matrix::from_dmatrix(block.into_dmatrix().exp());

        let ad = expm.sub2d_mat(0, n - 1, 0, n - 1)?;
        let bd1 = expm.sub2d_mat(0, n - 1, n + m, size - 1)?;
        let bd0 = expm.sub2d_mat(0, n - 1, n, n + m - 1)?.sub(&bd1)?;
        Ok(Discretization { dt, ad, bd0, bd1 })
    }

    /// Simulate the response to `u` sampled on `t`. See [`StateSpace::lsim_with`].
    pub fn lsim(
        &self,
        u: impl Into<Matrix>,
        t: &[f64],
        x0: Option<&[f64]>,
    ) -> LtiResult<SimulationTrace> {
        self.lsim_with(u, t, x0, &LsimOptions::default())
    }

    /// Simulate the response to `u` sampled on `t`, starting from `x0`
    /// (zero when `None`).
    ///
    /// `u` may be a scalar applied at every sample, a series of `t.len()`
    /// samples for a single-input model, or an `m x steps` / `steps x m`
    /// matrix. `t` must be strictly increasing with a constant step.
    pub fn lsim_with(
        &self,
        u: impl Into<Matrix>,
        t: &[f64],
        x0: Option<&[f64]>,
        opts: &LsimOptions,
    ) -> LtiResult<SimulationTrace> {
        let dt = validate_time(t, opts)?;
        let steps = t.len();
        let n = self.num_states();
        let u = input_matrix(u.into(), self.num_inputs(), steps)?;
        ensure_all_finite(&u.iter().collect::<Vec<_>>(), "input sample")?;

        let x0 = match x0 {
            Some(x0) if x0.len() != n => {
                return Err(LtiError::DimensionMismatch {
                    what: "initial state",
                    expected: n,
                    actual: x0.len(),
                });
            }
            Some(x0) => {
                ensure_all_finite(x0, "initial state")?;
                x0.to_vec()
            }
            None => vec![0.0; n],
        };

        debug!(steps, dt, states = n, inputs = self.num_inputs(), "lsim");
        let disc = self.discretize(dt)?;

        let ad = disc.ad.as_dmatrix();
        let bd0 = disc.bd0.as_dmatrix();
        let bd1 = disc.bd1.as_dmatrix();
        let um = u.as_dmatrix();

        let mut x = DMatrix::<f64>::zeros(n, steps);
        x.set_column(0, &DVector::from_vec(x0));
        for i in 1..steps {
            let next = ad * x.column(i - 1) + bd0 * um.column(i - 1) + bd1 * um.column(i);
            x.set_column(i, &next);
        }

        let x = Matrix::from_dmatrix(x);
        let y = self.c_mat().matmul(&x)?.add(&self.d_mat().matmul(&u)?)?;
        Ok(SimulationTrace {
            t: t.to_vec(),
            x,
            y,
        })
    }

    /// Unit step response on `t` from rest.
    pub fn step(&self, t: &[f64]) -> LtiResult<SimulationTrace> {
        self.lsim(1.0, t, None)
    }
}

impl TransferFunction {
    /// Simulate from rest through the controller canonical realisation.
    pub fn lsim(&self, u: impl Into<Matrix>, t: &[f64]) -> LtiResult<SimulationTrace> {
        self.tf2ss()?.lsim(u, t, None)
    }

    /// Unit step response on `t` from rest.
    pub fn step(&self, t: &[f64]) -> LtiResult<SimulationTrace> {
        self.tf2ss()?.step(t)
    }
}
