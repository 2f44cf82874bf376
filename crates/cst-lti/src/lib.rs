//! Linear time-invariant models for the control systems toolbox.
//!
//! This crate builds on the `cst-matrix` kernel to provide continuous-time
//! SISO transfer functions and (MIMO) state-space models, with the analysis
//! operations front ends need.
//!
//! # Architecture
//!
//! - [`TransferFunction`] holds numerator and denominator coefficients,
//!   highest power first
//! - [`StateSpace`] holds `A`, `B`, `C`, `D`, validated once at construction
//! - [`tf2ss`] realises a proper transfer function in controller canonical form
//! - frequency response is evaluated on `s = jω`, in parallel across the grid
//! - [`StateSpace::lsim`] simulates on a uniform time grid using a Van Loan
//!   block-exponential discretization
//!
//! # Example
//!
//! ```
//! use cst_lti::TransferFunction;
//! use cst_matrix::linspace;
//!
//! // 1 / (s + 1)
//! let g = TransferFunction::new(vec![1.0], vec![1.0, 1.0]).unwrap();
//! let t: Vec<f64> = linspace(0.0, 10.0, 101).iter().collect();
//! let y = g.step(&t).unwrap().output(0);
//!
//! assert_eq!(y[0], 0.0);
//! assert!((y[100] - 1.0).abs() < 1e-3);
//! ```
//!
//! All models are immutable values and serialise with `serde`.

pub mod convert;
pub mod error;
pub mod freqresp;
pub mod lsim;
pub mod state_space;
pub mod transfer_function;

pub use convert::tf2ss;
pub use error::{LtiError, LtiResult};
pub use freqresp::{Bode, FrequencyResponse, MagnitudeMode, MagnitudePhase, to_magph};
pub use lsim::{Discretization, LsimOptions, SimulationTrace};
pub use state_space::StateSpace;
pub use transfer_function::TransferFunction;
