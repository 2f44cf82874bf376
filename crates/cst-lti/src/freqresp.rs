//! Frequency response of LTI models.
//!
//! Responses are evaluated on `s = jω` for each angular frequency
//! independently. Transfer functions fan the frequency grid out over
//! `rayon`; results always come back in input order.

use std::f64::consts::PI;
use std::str::FromStr;

use cst_core::ensure_all_finite;
use cst_matrix::{Matrix, logspace, unwrap_phase};
use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};
use crate::state_space::StateSpace;
use crate::transfer_function::TransferFunction;

/// Complex response `H(jω)` sampled on a frequency grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    /// Angular frequencies (rad/s).
    pub w: Vec<f64>,
    /// One response value per entry of `w`.
    pub h: Vec<Complex64>,
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.h.len()
    }

    pub fn is_empty(&self) -> bool {
        self.h.is_empty()
    }

    /// Magnitude and phase of the response. See [`to_magph`].
    pub fn to_magph(&self, mode: MagnitudeMode, unwrap: bool) -> LtiResult<MagnitudePhase> {
        to_magph(&self.h, mode, unwrap)
    }
}

/// Scale used for magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeMode {
    /// `20 log10 |H|`.
    #[default]
    Db,
    /// `|H|`.
    Abs,
}

impl FromStr for MagnitudeMode {
    type Err = LtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "db" => Ok(MagnitudeMode::Db),
            "abs" => Ok(MagnitudeMode::Abs),
            _ => Err(LtiError::InvalidOption {
                option: "magnitude mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Magnitude and phase (degrees) rows of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudePhase {
    pub magnitude: Vec<f64>,
    pub phase: Vec<f64>,
}

/// Bode data: frequency grid with dB magnitude and unwrapped phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bode {
    pub w: Vec<f64>,
    pub magnitude: Vec<f64>,
    pub phase: Vec<f64>,
}

/// Split a complex response into magnitude and phase in degrees.
///
/// With `unwrap` set the phase is unwrapped in radians before conversion,
/// removing the jumps at ±180°.
pub fn to_magph(h: &[Complex64], mode: MagnitudeMode, unwrap: bool) -> LtiResult<MagnitudePhase> {
    let magnitude = h
        .iter()
        .map(|z| match mode {
            MagnitudeMode::Db => 20.0 * z.norm().log10(),
            MagnitudeMode::Abs => z.norm(),
        })
        .collect();

    let radians: Vec<f64> = h.iter().map(|z| z.arg()).collect();
    let radians = if unwrap && radians.len() > 1 {
        unwrap_phase(radians, None)?.iter().collect()
    } else {
        radians
    };

    Ok(MagnitudePhase {
        magnitude,
        phase: radians.into_iter().map(|r| r * 180.0 / PI).collect(),
    })
}

fn evaluate_tf(b: &[f64], a: &[f64], w: f64) -> Complex64 {
    let s = Complex64::new(0.0, w);
    let order = b.len().max(a.len());
    let powers: Vec<Complex64> = (0..order).map(|k| s.powu(k as u32)).collect();

    // Highest coefficient pairs with the highest power of each polynomial.
    let poly = |coeffs: &[f64]| -> Complex64 {
        let deg = coeffs.len() - 1;
        coeffs
            .iter()
            .enumerate()
            .map(|(i, &c)| powers[deg - i] * c)
            .sum()
    };
    poly(b) / poly(a)
}

impl TransferFunction {
    /// Evaluate `B(jω) / A(jω)` on every frequency in `w`.
    ///
    /// A frequency that hits a pole yields a non-finite value rather than an
    /// error, matching plain complex division.
    pub fn freqresp(&self, w: &[f64]) -> LtiResult<FrequencyResponse> {
        ensure_all_finite(w, "frequency")?;
        let h = w
            .par_iter()
            .map(|&wk| evaluate_tf(self.b(), self.a(), wk))
            .collect();
        Ok(FrequencyResponse { w: w.to_vec(), h })
    }

    /// Bode data on `w`, or on `logspace(-4, 4, 255)` when `w` is `None`.
    pub fn bode(&self, w: Option<&[f64]>) -> LtiResult<Bode> {
        let grid: Vec<f64> = match w {
            Some(w) => w.to_vec(),
            None => logspace(-4.0, 4.0, 255).iter().collect(),
        };
        let resp = self.freqresp(&grid)?;
        let MagnitudePhase { magnitude, phase } = resp.to_magph(MagnitudeMode::Db, true)?;
        Ok(Bode {
            w: resp.w,
            magnitude,
            phase,
        })
    }
}

fn to_complex(m: &Matrix) -> DMatrix<Complex64> {
    m.as_dmatrix().map(|v| Complex64::new(v, 0.0))
}

impl StateSpace {
    /// Evaluate `C (jωI - A)^-1 B + D` for a single-input single-output
    /// model.
    ///
    /// Fails with [`LtiError::Singular`] when `jω` is an eigenvalue of `A`.
    pub fn freqresp(&self, w: &[f64]) -> LtiResult<FrequencyResponse> {
        if self.num_inputs() != 1 {
            return Err(LtiError::DimensionMismatch {
                what: "frequency response inputs",
                expected: 1,
                actual: self.num_inputs(),
            });
        }
        if self.num_outputs() != 1 {
            return Err(LtiError::DimensionMismatch {
                what: "frequency response outputs",
                expected: 1,
                actual: self.num_outputs(),
            });
        }
        ensure_all_finite(w, "frequency")?;

        let n = self.num_states();
        let a = to_complex(self.a_mat());
        let b = to_complex(self.b_mat());
        let c = to_complex(self.c_mat());
        let d = Complex64::new(self.d_mat()[(0, 0)], 0.0);

        let h = w
            .iter()
            .map(|&wk| {
                if n == 0 {
                    return Ok(d);
                }
                let jw = DMatrix::<Complex64>::identity(n, n) * Complex64::new(0.0, wk);
                let x = (jw - &a).lu().solve(&b).ok_or(LtiError::Singular {
                    what: "jwI - A has a pole on the imaginary axis",
                })?;
                Ok((&c * x)[(0, 0)] + d)
            })
            .collect::<LtiResult<Vec<_>>>()?;

        Ok(FrequencyResponse { w: w.to_vec(), h })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn first_order() -> TransferFunction {
        TransferFunction::new(vec![1.0], vec![1.0, 1.0]).unwrap()
    }

    #[test]
    fn first_order_lag_at_corner() {
        let resp = first_order().freqresp(&[0.0, 1.0]).unwrap();
        assert_relative_eq!(resp.h[0].re, 1.0);
        assert_relative_eq!(resp.h[1].re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(resp.h[1].im, -0.5, epsilon = 1e-12);

        let mp = resp.to_magph(MagnitudeMode::Db, false).unwrap();
        assert_relative_eq!(mp.magnitude[1], -3.0103, epsilon = 1e-4);
        assert_relative_eq!(mp.phase[1], -45.0, epsilon = 1e-9);
    }

    #[test]
    fn improper_numerator_is_aligned() {
        // s / 1
        let tf = TransferFunction::new(vec![1.0, 0.0], vec![1.0]).unwrap();
        let resp = tf.freqresp(&[2.0]).unwrap();
        assert_relative_eq!(resp.h[0].im, 2.0);
        assert_relative_eq!(resp.h[0].re, 0.0);
    }

    #[test]
    fn results_keep_input_order() {
        let w: Vec<f64> = (0..64).map(|k| k as f64 * 0.25).collect();
        let resp = first_order().freqresp(&w).unwrap();
        for (wk, hk) in w.iter().zip(&resp.h) {
            let expected = Complex64::new(1.0, 0.0) / Complex64::new(1.0, *wk);
            assert_relative_eq!(hk.re, expected.re, epsilon = 1e-12);
            assert_relative_eq!(hk.im, expected.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn magnitude_mode_parsing() {
        assert_eq!("dB".parse::<MagnitudeMode>().unwrap(), MagnitudeMode::Db);
        assert_eq!("ABS".parse::<MagnitudeMode>().unwrap(), MagnitudeMode::Abs);
        assert_eq!(
            "linear".parse::<MagnitudeMode>().unwrap_err(),
            LtiError::InvalidOption {
                option: "magnitude mode",
                value: "linear".to_string()
            }
        );
    }

    #[test]
    fn abs_magnitude() {
        let resp = first_order().freqresp(&[1.0]).unwrap();
        let mp = resp.to_magph(MagnitudeMode::Abs, true).unwrap();
        assert_relative_eq!(mp.magnitude[0], 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn unwrapped_phase_of_third_order_lag_passes_minus_180() {
        // 1 / (s + 1)^3 heads towards -270 degrees
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 3.0, 3.0, 1.0]).unwrap();
        let bode = tf.bode(None).unwrap();
        assert_eq!(bode.w.len(), 255);
        let last = *bode.phase.last().unwrap();
        assert_relative_eq!(last, -270.0, epsilon = 0.1);

        let wrapped = tf.freqresp(&bode.w).unwrap().to_magph(MagnitudeMode::Db, false).unwrap();
        assert!(wrapped.phase.iter().all(|p| *p > -180.0 - 1e-9 && *p <= 180.0));
    }

    #[test]
    fn non_finite_frequency_is_rejected() {
        assert!(matches!(
            first_order().freqresp(&[1.0, f64::NAN]),
            Err(LtiError::Core(_))
        ));
    }

    #[test]
    fn state_space_matches_transfer_function() {
        let tf = TransferFunction::new(vec![1.0, 3.0], vec![1.0, 3.0, 2.0]).unwrap();
        let ss = tf.tf2ss().unwrap();
        let w = [0.0, 0.1, 1.0, 10.0];
        let from_tf = tf.freqresp(&w).unwrap();
        let from_ss = ss.freqresp(&w).unwrap();
        for (x, y) in from_tf.h.iter().zip(&from_ss.h) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-10);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn state_space_pole_on_axis_is_singular() {
        // integrator at w = 0
        let ss = TransferFunction::new(vec![1.0], vec![1.0, 0.0]).unwrap().tf2ss().unwrap();
        assert!(matches!(ss.freqresp(&[0.0]), Err(LtiError::Singular { .. })));
    }

    #[test]
    fn state_space_static_gain() {
        let ss = StateSpace::static_gain(Matrix::scalar(4.0)).unwrap();
        let resp = ss.freqresp(&[0.0, 100.0]).unwrap();
        assert!(resp.h.iter().all(|h| *h == Complex64::new(4.0, 0.0)));
    }

    #[test]
    fn state_space_mimo_is_rejected() {
        let ss = StateSpace::static_gain(Matrix::from_rows(&[[1.0, 2.0]]).unwrap()).unwrap();
        assert!(matches!(
            ss.freqresp(&[1.0]),
            Err(LtiError::DimensionMismatch { expected: 1, actual: 2, .. })
        ));
    }
}
