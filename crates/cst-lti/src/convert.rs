//! Transfer function to state-space conversion.

use cst_matrix::Matrix;
use tracing::debug;

use crate::error::{LtiError, LtiResult};
use crate::state_space::StateSpace;
use crate::transfer_function::TransferFunction;

/// Controller canonical realisation of a proper transfer function.
///
/// With `a` normalised to monic and both polynomials written in ascending
/// powers, the realisation is:
/// - `A` with ones on the superdiagonal and last row `-a[0..n]`
/// - `B = e_n`
/// - `C[k] = b[k] - a[k] * b[n]`
/// - `D = b[n]`
///
/// A constant denominator gives a static gain with zero states.
pub fn tf2ss(tf: &TransferFunction) -> LtiResult<StateSpace> {
    let (b, a) = (tf.b(), tf.a());
    if b.len() > a.len() {
        return Err(LtiError::ImproperTransferFunction {
            num_len: b.len(),
            den_len: a.len(),
        });
    }
    let lead = a[0];
    if lead == 0.0 {
        return Err(LtiError::InvalidArg {
            what: "leading denominator coefficient must be non-zero",
        });
    }

    let pad = a.len() - b.len();
    let b_asc: Vec<f64> = std::iter::repeat_n(0.0, pad)
        .chain(b.iter().copied())
        .map(|v| v / lead)
        .rev()
        .collect();
    let a_asc: Vec<f64> = a.iter().map(|v| v / lead).rev().collect();

    let n = a.len() - 1;
    let d = b_asc[n];
    debug!(states = n, "converting transfer function to state space");

    if n == 0 {
        return StateSpace::static_gain(Matrix::scalar(d));
    }

    let a_mat = Matrix::from_fn(n, n, |i, j| {
        if i == n - 1 {
            -a_asc[j]
        } else if j == i + 1 {
            1.0
        } else {
            0.0
        }
    });
    let b_mat = Matrix::from_fn(n, 1, |i, _| if i == n - 1 { 1.0 } else { 0.0 });
    let c_mat = Matrix::from_fn(1, n, |_, j| b_asc[j] - a_asc[j] * d);

    StateSpace::new(a_mat, b_mat, c_mat, Matrix::scalar(d))
}

impl TransferFunction {
    /// See [`tf2ss`].
    pub fn tf2ss(&self) -> LtiResult<StateSpace> {
        tf2ss(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cst_core::Tolerances;

    #[test]
    fn second_order_lag() {
        // 1 / (s^2 + 3s + 2)
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 3.0, 2.0]).unwrap();
        let ss = tf2ss(&tf).unwrap();
        assert_eq!(ss.a_mat().to_rows(), vec![vec![0.0, 1.0], vec![-2.0, -3.0]]);
        assert_eq!(ss.b_mat().to_rows(), vec![vec![0.0], vec![1.0]]);
        assert_eq!(ss.c_mat().to_rows(), vec![vec![1.0, 0.0]]);
        assert_eq!(ss.d_mat().to_rows(), vec![vec![0.0]]);
    }

    #[test]
    fn biproper_has_feedthrough() {
        // (2s + 1) / (s + 3) = 2 + (-5) / (s + 3)
        let tf = TransferFunction::new(vec![2.0, 1.0], vec![1.0, 3.0]).unwrap();
        let ss = tf.tf2ss().unwrap();
        assert_eq!(ss.a_mat().to_rows(), vec![vec![-3.0]]);
        assert_eq!(ss.c_mat().to_rows(), vec![vec![-5.0]]);
        assert_eq!(ss.d_mat().to_rows(), vec![vec![2.0]]);
    }

    #[test]
    fn denominator_is_normalised() {
        // 4 / (2s + 2) = 2 / (s + 1)
        let tf = TransferFunction::new(vec![4.0], vec![2.0, 2.0]).unwrap();
        let ss = tf.tf2ss().unwrap();
        assert_eq!(ss.a_mat().to_rows(), vec![vec![-1.0]]);
        assert_eq!(ss.c_mat().to_rows(), vec![vec![2.0]]);
    }

    #[test]
    fn common_factor_gives_same_realisation() {
        // (0.3s + 0.1) / (0.1s^2 + 0.7s + 1.2) is 3 * (s + 1/3) / (s^2 + 7s + 12)
        let scaled = TransferFunction::new(vec![0.3, 0.1], vec![0.1, 0.7, 1.2]).unwrap();
        let plain = TransferFunction::new(vec![3.0, 1.0], vec![1.0, 7.0, 12.0]).unwrap();
        let (x, y) = (scaled.tf2ss().unwrap(), plain.tf2ss().unwrap());
        let tol = Tolerances::default();
        assert!(x.a_mat().approx_eq(y.a_mat(), tol));
        assert!(x.b_mat().approx_eq(y.b_mat(), tol));
        assert!(x.c_mat().approx_eq(y.c_mat(), tol));
        assert!(x.d_mat().approx_eq(y.d_mat(), tol));
    }

    #[test]
    fn static_gain() {
        let tf = TransferFunction::new(vec![3.0], vec![2.0]).unwrap();
        let ss = tf.tf2ss().unwrap();
        assert_eq!(ss.num_states(), 0);
        assert_eq!(ss.d_mat().to_rows(), vec![vec![1.5]]);
    }

    #[test]
    fn improper_is_rejected() {
        let tf = TransferFunction::new(vec![1.0, 0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert_eq!(
            tf.tf2ss().unwrap_err(),
            LtiError::ImproperTransferFunction {
                num_len: 3,
                den_len: 2
            }
        );
    }

    #[test]
    fn zero_leading_denominator_is_rejected() {
        let tf = TransferFunction::new(vec![1.0], vec![0.0, 1.0]).unwrap();
        assert!(matches!(tf.tf2ss(), Err(LtiError::InvalidArg { .. })));
    }
}
