//! cst-core: stable foundation for the control systems toolbox.
//!
//! Contains:
//! - numeric (Real + tolerances + rounding + kernel constants)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
