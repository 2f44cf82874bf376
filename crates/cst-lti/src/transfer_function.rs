//! Transfer function models.

use cst_core::ensure_all_finite;
use cst_matrix::{Eigenvalue, roots};
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};

/// Rational transfer function `G(s) = B(s) / A(s)`.
///
/// Coefficients are stored highest power first: `[1.0, 3.0, 2.0]` is
/// `s^2 + 3s + 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransferFunctionParts")]
pub struct TransferFunction {
    b: Vec<f64>,
    a: Vec<f64>,
}

#[derive(Deserialize)]
struct TransferFunctionParts {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TryFrom<TransferFunctionParts> for TransferFunction {
    type Error = LtiError;

    fn try_from(parts: TransferFunctionParts) -> Result<Self, Self::Error> {
        Self::new(parts.b, parts.a)
    }
}

impl TransferFunction {
    /// Create a transfer function from numerator and denominator
    /// coefficients.
    ///
    /// # Arguments
    ///
    /// * `b` - Numerator coefficients, highest power first
    /// * `a` - Denominator coefficients, highest power first
    ///
    /// Both vectors must be non-empty and finite. Properness is only
    /// required when converting to state space.
    pub fn new(b: impl Into<Vec<f64>>, a: impl Into<Vec<f64>>) -> LtiResult<Self> {
        let b = b.into();
        let a = a.into();
        if b.is_empty() {
            return Err(LtiError::InvalidArg {
                what: "numerator must have at least one coefficient",
            });
        }
        if a.is_empty() {
            return Err(LtiError::InvalidArg {
                what: "denominator must have at least one coefficient",
            });
        }
        ensure_all_finite(&b, "numerator coefficient")?;
        ensure_all_finite(&a, "denominator coefficient")?;
        Ok(Self { b, a })
    }

    /// Numerator coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Degree of the denominator.
    pub fn order(&self) -> usize {
        self.a.len() - 1
    }

    /// Numerator no longer than the denominator.
    pub fn is_proper(&self) -> bool {
        self.b.len() <= self.a.len()
    }

    /// Roots of the denominator.
    pub fn poles(&self) -> LtiResult<Vec<Eigenvalue>> {
        Ok(roots(&self.a)?)
    }

    /// Roots of the numerator.
    pub fn zeros(&self) -> LtiResult<Vec<Eigenvalue>> {
        Ok(roots(&self.b)?)
    }
}
