use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Imaginary parts below this are treated as zero when classifying eigenvalues.
pub const EPSILON: Real = 1e-11;

/// Decimal digits kept when rounding reported results (ranges, eigenvalues).
pub const ROUND_RESULT_TO: u32 = 8;

/// Sweep cap per deflation for the QR eigenvalue fallback.
pub const MAX_QR_ITERATIONS: usize = 100;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check every value of a coefficient vector or matrix buffer.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), CoreError> {
    values
        .iter()
        .try_for_each(|&v| ensure_finite(v, what).map(|_| ()))
}

/// Round to a fixed number of decimal digits, half away from zero.
///
/// Values too large to carry `digits` decimals are returned unchanged.
pub fn round_to(v: Real, digits: u32) -> Real {
    let factor = 10f64.powi(digits as i32);
    let scaled = v * factor;
    if !scaled.is_finite() || scaled.abs() >= 2f64.powi(52) {
        return v;
    }
    let rounded = scaled.round() / factor;
    // keep -0.0 out of reported results
    if rounded == 0.0 { 0.0 } else { rounded }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_to_stays_within_half_ulp_of_grid(v in -1.0e6_f64..1.0e6_f64) {
            let r = round_to(v, ROUND_RESULT_TO);
            prop_assert!((r - v).abs() <= 0.5e-8 + 1e-9);
        }
    }
}
