//! Eigenvalues and polynomial roots.
//!
//! Raw eigenvalue extraction sits behind [`EigenSolver`] so the numerical
//! routine can be swapped:
//! - [`SchurEigenSolver`] (default) uses nalgebra's real Schur decomposition
//! - [`QrEigenSolver`] runs a capped Francis double-shift QR iteration on the
//!   Hessenberg form and returns a best-effort result if the cap is hit
//!
//! [`eig`] and [`roots`] round and classify the raw values into
//! [`Eigenvalue::Real`] and [`Eigenvalue::Complex`].

use cst_core::{EPSILON, MAX_QR_ITERATIONS, ROUND_RESULT_TO, Real, ensure_all_finite, round_to};
use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

/// Raw eigenvalue extraction.
pub trait EigenSolver {
    /// All eigenvalues of a square matrix, in no particular order.
    fn eigenvalues(&self, a: &Matrix) -> MatrixResult<Vec<Complex64>>;
}

/// Eigenvalues from nalgebra's real Schur decomposition.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchurEigenSolver;

impl EigenSolver for SchurEigenSolver {
    fn eigenvalues(&self, a: &Matrix) -> MatrixResult<Vec<Complex64>> {
        a.ensure_square()?;
        if a.is_empty() {
            return Ok(Vec::new());
        }
        ensure_all_finite(a.as_dmatrix().as_slice(), "matrix entry")?;
        Ok(a.as_dmatrix().complex_eigenvalues().iter().copied().collect())
    }
}

/// Francis double-shift QR iteration on the upper Hessenberg form.
///
/// Blocks that stall get the classic exceptional shifts after 10 and 30
/// sweeps, which breaks up cyclic companion matrices such as `s^4 - 1`.
#[derive(Debug, Clone, Copy)]
pub struct QrEigenSolver {
    /// Sweeps allowed per deflation. Hitting it is not an error.
    pub max_iterations: usize,
    /// Relative size below which a subdiagonal entry counts as zero.
    pub tol: Real,
}

impl Default for QrEigenSolver {
    fn default() -> Self {
        Self {
            max_iterations: MAX_QR_ITERATIONS,
            tol: f64::EPSILON,
        }
    }
}

impl QrEigenSolver {
    fn negligible(&self, h: &DMatrix<Real>, i: usize, norm: Real) -> bool {
        let mut scale = h[(i, i)].abs() + h[(i + 1, i + 1)].abs();
        if scale == 0.0 {
            scale = norm;
        }
        h[(i + 1, i)].abs() < self.tol * scale
    }

    /// Top row of the unreduced block that ends at row `hi`.
    fn block_start(&self, h: &DMatrix<Real>, hi: usize, norm: Real) -> usize {
        let mut l = hi;
        while l > 0 && !self.negligible(h, l - 1, norm) {
            l -= 1;
        }
        l
    }

    /// One implicit double-shift sweep over rows `l..=hi`, with the shift
    /// pair given by its sum-like terms `x`, `y` and product term `w`.
    fn francis_step(
        &self,
        h: &mut DMatrix<Real>,
        l: usize,
        hi: usize,
        (x, y, w): (Real, Real, Real),
    ) {
        // Look for two consecutive small subdiagonal entries.
        let mut m = hi - 2;
        let mut p;
        let mut q;
        let mut r;
        loop {
            let z = h[(m, m)];
            let (rr, ss) = (x - z, y - z);
            p = (rr * ss - w) / h[(m + 1, m)] + h[(m, m + 1)];
            q = h[(m + 1, m + 1)] - z - rr - ss;
            r = h[(m + 2, m + 1)];
            let scale = p.abs() + q.abs() + r.abs();
            p /= scale;
            q /= scale;
            r /= scale;
            if m == l {
                break;
            }
            let coupling = h[(m, m - 1)].abs() * (q.abs() + r.abs());
            let size = p.abs() * (h[(m - 1, m - 1)].abs() + z.abs() + h[(m + 1, m + 1)].abs());
            if coupling < self.tol * size {
                break;
            }
            m -= 1;
        }

        for i in m + 2..=hi {
            h[(i, i - 2)] = 0.0;
            if i > m + 2 {
                h[(i, i - 3)] = 0.0;
            }
        }

        for k in m..hi {
            let notlast = k != hi - 1;
            let mut scale = 0.0;
            if k != m {
                p = h[(k, k - 1)];
                q = h[(k + 1, k - 1)];
                r = if notlast { h[(k + 2, k - 1)] } else { 0.0 };
                scale = p.abs() + q.abs() + r.abs();
                if scale == 0.0 {
                    continue;
                }
                p /= scale;
                q /= scale;
                r /= scale;
            }
            let s = (p * p + q * q + r * r).sqrt().copysign(p);
            if s == 0.0 {
                continue;
            }
            if k != m {
                h[(k, k - 1)] = -s * scale;
            } else if l != m {
                h[(k, k - 1)] = -h[(k, k - 1)];
            }
            p += s;
            let (vx, vy, vz) = (p / s, q / s, r / s);
            q /= p;
            r /= p;

            for j in k..=hi {
                let mut t = h[(k, j)] + q * h[(k + 1, j)];
                if notlast {
                    t += r * h[(k + 2, j)];
                    h[(k + 2, j)] -= t * vz;
                }
                h[(k, j)] -= t * vx;
                h[(k + 1, j)] -= t * vy;
            }
            for i in l..=hi.min(k + 3) {
                let mut t = vx * h[(i, k)] + vy * h[(i, k + 1)];
                if notlast {
                    t += vz * h[(i, k + 2)];
                    h[(i, k + 2)] -= t * r;
                }
                h[(i, k)] -= t;
                h[(i, k + 1)] -= t * q;
            }
        }
    }

    /// Read eigenvalues of rows `0..=hi` off the quasi-triangular form.
    fn read_blocks(
        &self,
        h: &DMatrix<Real>,
        hi: usize,
        norm: Real,
        shift: Real,
        out: &mut Vec<Complex64>,
    ) {
        let mut i = 0;
        while i <= hi {
            if i < hi && !self.negligible(h, i, norm) {
                let (l1, l2) = block_pair(h, i, shift);
                out.push(l1);
                out.push(l2);
                i += 2;
            } else {
                out.push(Complex64::new(h[(i, i)] + shift, 0.0));
                i += 1;
            }
        }
    }
}

impl EigenSolver for QrEigenSolver {
    fn eigenvalues(&self, a: &Matrix) -> MatrixResult<Vec<Complex64>> {
        a.ensure_square()?;
        let n = a.nrows();
        if n == 0 {
            return Ok(Vec::new());
        }
        ensure_all_finite(a.as_dmatrix().as_slice(), "matrix entry")?;

        let mut h = a.as_dmatrix().clone().hessenberg().h();
        let norm: Real = h.iter().map(|v| v.abs()).sum();
        if norm == 0.0 {
            return Ok(vec![Complex64::new(0.0, 0.0); n]);
        }

        let mut values = Vec::with_capacity(n);
        let mut exshift = 0.0;
        let mut iter = 0;
        let mut sweeps = 0;
        let mut end = n;
        while end > 0 {
            let hi = end - 1;
            let l = self.block_start(&h, hi, norm);
            if l == hi {
                values.push(Complex64::new(h[(hi, hi)] + exshift, 0.0));
                end -= 1;
                iter = 0;
                continue;
            }
            if l + 1 == hi {
                let (l1, l2) = block_pair(&h, l, exshift);
                values.push(l1);
                values.push(l2);
                end -= 2;
                iter = 0;
                continue;
            }
            if iter >= self.max_iterations {
                warn!(
                    max_iterations = self.max_iterations,
                    n, "QR iteration hit its cap; returning best-effort eigenvalues"
                );
                self.read_blocks(&h, hi, norm, exshift, &mut values);
                return Ok(values);
            }

            let mut x = h[(hi, hi)];
            let mut y = h[(hi - 1, hi - 1)];
            let mut w = h[(hi, hi - 1)] * h[(hi - 1, hi)];
            if iter == 10 {
                exshift += x;
                for i in 0..=hi {
                    h[(i, i)] -= x;
                }
                let s = h[(hi, hi - 1)].abs() + h[(hi - 1, hi - 2)].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }
            if iter == 30 {
                let half = (y - x) / 2.0;
                let disc = half * half + w;
                if disc > 0.0 {
                    let root = if y < x { -disc.sqrt() } else { disc.sqrt() };
                    let s = x - w / (half + root);
                    for i in 0..=hi {
                        h[(i, i)] -= s;
                    }
                    exshift += s;
                    x = 0.964;
                    y = x;
                    w = x;
                }
            }
            iter += 1;
            sweeps += 1;
            self.francis_step(&mut h, l, hi, (x, y, w));
        }
        debug!(sweeps, n, "QR iteration converged");
        Ok(values)
    }
}

/// Eigenvalues of the 2x2 block at rows `i, i + 1`, plus `shift`; a complex
/// pair comes out with the positive imaginary part first.
fn block_pair(h: &DMatrix<Real>, i: usize, shift: Real) -> (Complex64, Complex64) {
    let (a, b, c, d) = (h[(i, i)], h[(i, i + 1)], h[(i + 1, i)], h[(i + 1, i + 1)]);
    let w = c * b;
    let p = (a - d) / 2.0;
    let q = p * p + w;
    let z = q.abs().sqrt();
    let x = d + shift;
    if q >= 0.0 {
        let z = if p >= 0.0 { p + z } else { p - z };
        let first = x + z;
        let second = if z != 0.0 { x - w / z } else { first };
        (Complex64::new(first, 0.0), Complex64::new(second, 0.0))
    } else {
        (Complex64::new(x + p, z), Complex64::new(x + p, -z))
    }
}

/// An eigenvalue or root, rounded for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Eigenvalue {
    Real(Real),
    Complex { re: Real, im: Real },
}

impl Eigenvalue {
    /// Round both parts and drop imaginary parts below [`EPSILON`].
    pub fn classify(z: Complex64) -> Self {
        if z.im.abs() < EPSILON {
            Eigenvalue::Real(round_to(z.re, ROUND_RESULT_TO))
        } else {
            Eigenvalue::Complex {
                re: round_to(z.re, ROUND_RESULT_TO),
                im: round_to(z.im, ROUND_RESULT_TO),
            }
        }
    }

    pub fn re(&self) -> Real {
        match *self {
            Eigenvalue::Real(re) | Eigenvalue::Complex { re, .. } => re,
        }
    }

    pub fn im(&self) -> Real {
        match *self {
            Eigenvalue::Real(_) => 0.0,
            Eigenvalue::Complex { im, .. } => im,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Eigenvalue::Real(_))
    }

    pub fn to_complex(&self) -> Complex64 {
        Complex64::new(self.re(), self.im())
    }
}

impl std::fmt::Display for Eigenvalue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Eigenvalue::Real(re) => write!(f, "{re}"),
            Eigenvalue::Complex { re, im } if im < 0.0 => write!(f, "{re} - {}i", -im),
            Eigenvalue::Complex { re, im } => write!(f, "{re} + {im}i"),
        }
    }
}

/// Raw eigenvalues with the default solver.
pub fn eigenvalues(a: &Matrix) -> MatrixResult<Vec<Complex64>> {
    SchurEigenSolver.eigenvalues(a)
}

/// Rounded, classified eigenvalues of a square matrix.
pub fn eig(a: &Matrix) -> MatrixResult<Vec<Eigenvalue>> {
    eig_with(a, &SchurEigenSolver)
}

pub fn eig_with<S: EigenSolver + ?Sized>(a: &Matrix, solver: &S) -> MatrixResult<Vec<Eigenvalue>> {
    a.ensure_square()?;
    Ok(solver
        .eigenvalues(a)?
        .into_iter()
        .map(Eigenvalue::classify)
        .collect())
}

/// Drop leading zeros; fails if nothing is left.
fn trim_leading_zeros(poly: &[Real]) -> MatrixResult<&[Real]> {
    ensure_all_finite(poly, "polynomial coefficient")?;
    match poly.iter().position(|&c| c != 0.0) {
        Some(first) => Ok(&poly[first..]),
        None => Err(MatrixError::InvalidArg {
            what: "polynomial needs at least one non-zero coefficient",
        }),
    }
}

/// Companion matrix of a polynomial given highest degree first, e.g.
/// `[3, 1, -10]` for `3x^2 + x - 10`.
///
/// The polynomial is made monic; ones sit on the subdiagonal and the last
/// column holds the negated low-order coefficients. A constant polynomial
/// gives the empty matrix.
pub fn companion(poly: &[Real]) -> MatrixResult<Matrix> {
    let poly = trim_leading_zeros(poly)?;
    let degree = poly.len() - 1;
    let lead = poly[0];
    // ascending powers, monic, without the leading 1
    let low: Vec<Real> = poly[1..].iter().rev().map(|c| c / lead).collect();
    Ok(Matrix::from_fn(degree, degree, |i, j| {
        if j + 1 == degree {
            -low[i]
        } else if i == j + 1 {
            1.0
        } else {
            0.0
        }
    }))
}

/// Roots of a polynomial (highest degree first) via companion eigenvalues.
pub fn roots(poly: &[Real]) -> MatrixResult<Vec<Eigenvalue>> {
    roots_with(poly, &SchurEigenSolver)
}

pub fn roots_with<S: EigenSolver + ?Sized>(
    poly: &[Real],
    solver: &S,
) -> MatrixResult<Vec<Eigenvalue>> {
    if poly.is_empty() {
        return Err(MatrixError::InvalidArg {
            what: "polynomial has no coefficients",
        });
    }
    let c = companion(poly)?;
    eig_with(&c, solver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_real(values: &[Eigenvalue]) -> Vec<Real> {
        let mut re: Vec<Real> = values.iter().map(|e| e.re()).collect();
        re.sort_by(|a, b| a.partial_cmp(b).unwrap());
        re
    }

    #[test]
    fn roots_of_quadratic() {
        let r = roots(&[1.0, -3.0, 2.0]).unwrap();
        assert!(r.iter().all(Eigenvalue::is_real));
        assert_eq!(sorted_real(&r), vec![1.0, 2.0]);
    }

    #[test]
    fn roots_are_scale_invariant() {
        let r = roots(&[3.0, -9.0, 6.0]).unwrap();
        assert_eq!(sorted_real(&r), vec![1.0, 2.0]);
    }

    #[test]
    fn complex_pair_is_classified() {
        // s^2 + 2s + 5 = (s + 1 - 2i)(s + 1 + 2i)
        let r = roots(&[1.0, 2.0, 5.0]).unwrap();
        assert_eq!(r.len(), 2);
        for e in &r {
            assert!(!e.is_real());
            assert_eq!(e.re(), -1.0);
            assert_eq!(e.im().abs(), 2.0);
        }
    }

    #[test]
    fn companion_layout() {
        let c = companion(&[2.0, 4.0, -6.0, 8.0]).unwrap();
        assert_eq!(
            c.to_rows(),
            vec![
                vec![0.0, 0.0, -4.0],
                vec![1.0, 0.0, 3.0],
                vec![0.0, 1.0, -2.0],
            ]
        );
    }

    #[test]
    fn leading_zeros_and_constants() {
        assert_eq!(sorted_real(&roots(&[0.0, 1.0, -4.0]).unwrap()), vec![4.0]);
        assert!(roots(&[5.0]).unwrap().is_empty());
        assert!(matches!(roots(&[0.0, 0.0]), Err(MatrixError::InvalidArg { .. })));
        assert!(matches!(roots(&[]), Err(MatrixError::InvalidArg { .. })));
    }

    #[test]
    fn eig_requires_square() {
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(eig(&m), Err(MatrixError::NotSquare { rows: 1, cols: 3 }));
    }

    #[test]
    fn qr_solver_matches_schur_on_real_spectrum() {
        let r = roots_with(&[1.0, -6.0, 11.0, -6.0], &QrEigenSolver::default()).unwrap();
        assert_eq!(sorted_real(&r), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn qr_solver_reads_complex_blocks() {
        // (s + 3)(s^2 + 2s + 2)
        let r = roots_with(&[1.0, 5.0, 8.0, 6.0], &QrEigenSolver::default()).unwrap();
        let real: Vec<_> = r.iter().filter(|e| e.is_real()).collect();
        let complex: Vec<_> = r.iter().filter(|e| !e.is_real()).collect();
        assert_eq!(real.len(), 1);
        assert!((real[0].re() + 3.0).abs() < 1e-6);
        assert_eq!(complex.len(), 2);
        for e in complex {
            assert!((e.re() + 1.0).abs() < 1e-6);
            assert!((e.im().abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn qr_solver_with_zero_budget_still_answers() {
        let solver = QrEigenSolver {
            max_iterations: 0,
            ..QrEigenSolver::default()
        };
        let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 5.0]]).unwrap();
        let mut re: Vec<Real> = solver.eigenvalues(&a).unwrap().iter().map(|z| z.re).collect();
        re.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(re, vec![2.0, 5.0]);
    }

    fn sorted_pairs(values: &[Eigenvalue]) -> Vec<(Real, Real)> {
        let mut out: Vec<_> = values.iter().map(|e| (e.re(), e.im())).collect();
        out.sort_by(|a, b| a.partial_cmp(b).unwrap());
        out
    }

    #[test]
    fn qr_solver_breaks_cyclic_companion() {
        // s^4 - 1 has a companion matrix that plain shifted QR cycles on.
        let p = [1.0, 0.0, 0.0, 0.0, -1.0];
        let qr = sorted_pairs(&roots_with(&p, &QrEigenSolver::default()).unwrap());
        let schur = sorted_pairs(&roots(&p).unwrap());
        assert_eq!(qr.len(), 4);
        for ((qr_re, qr_im), (re, im)) in qr.iter().zip(&schur) {
            assert!((qr_re - re).abs() < 1e-6, "{qr:?} vs {schur:?}");
            assert!((qr_im - im).abs() < 1e-6, "{qr:?} vs {schur:?}");
        }
    }

    #[test]
    fn qr_solver_handles_repeated_roots() {
        // (s + 1)^4
        let r = roots_with(&[1.0, 4.0, 6.0, 4.0, 1.0], &QrEigenSolver::default()).unwrap();
        assert_eq!(r.len(), 4);
        for e in &r {
            assert!((e.to_complex() - Complex64::new(-1.0, 0.0)).norm() < 2e-3, "{e}");
        }
    }

    #[test]
    fn display_forms() {
        assert_eq!(Eigenvalue::Real(1.5).to_string(), "1.5");
        assert_eq!(Eigenvalue::Complex { re: -1.0, im: -2.0 }.to_string(), "-1 - 2i");
    }
}
