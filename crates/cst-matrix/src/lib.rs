//! Matrix primitives and numerical utilities for the control systems toolbox.
//!
//! The kernel works on small dense real matrices. Everything here returns new
//! values; nothing mutates its inputs.
//!
//! # Modules
//!
//! - [`matrix`]: the [`Matrix`] value type, shape checks and arithmetic
//! - [`range`]: MATLAB-style slice descriptors (`"0:1,:"`, `":-1"`, ...)
//! - [`calculus`]: `diff`, `cumsum`, phase unwrapping, ranges and factories
//! - [`eigen`]: companion matrices, polynomial roots and eigenvalues behind
//!   the [`EigenSolver`] interface
//!
//! # Indexing
//!
//! Slice indices are zero-based and inclusive on both ends. Negative indices
//! count from the far end with `-1` resolving to `len - 2`, so `":-1"` drops
//! the last element.

pub mod calculus;
pub mod eigen;
pub mod error;
pub mod matrix;
pub mod range;

pub use calculus::{
    MAX_COLON_LEN, colon, conv, cumsum, diff, eye, linspace, logspace, unwrap_phase, zeros,
};
pub use eigen::{
    EigenSolver, Eigenvalue, QrEigenSolver, SchurEigenSolver, companion, eig, eig_with,
    eigenvalues, roots, roots_with,
};
pub use error::{MatrixError, MatrixResult};
pub use matrix::Matrix;
pub use range::{Axis, Range, RangeArg, SliceSpec};

pub use num_complex::Complex64;
