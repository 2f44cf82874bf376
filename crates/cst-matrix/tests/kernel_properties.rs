//! Behaviour of the matrix kernel as seen from downstream crates.

use cst_matrix::{
    Eigenvalue, Matrix, MatrixError, QrEigenSolver, SchurEigenSolver, colon, cumsum, diff, eig,
    eig_with, eye, roots, zeros,
};

#[test]
fn vector_slicing_examples() {
    let a = Matrix::from(vec![1.0, 2.0, 3.0]);

    assert_eq!(a.sub2d_vec(":", "").unwrap().to_rows(), vec![vec![1.0, 2.0, 3.0]]);
    assert_eq!(a.sub2d_vec(1, ":").unwrap().to_rows(), vec![vec![2.0, 3.0]]);
    assert_eq!(a.sub2d_vec(":", -1).unwrap().to_rows(), vec![vec![1.0, 2.0]]);
}

#[test]
fn matrix_block_extraction() {
    let m = Matrix::from_rows(&[
        [1.0, 2.0, 3.0, 4.0],
        [5.0, 6.0, 7.0, 8.0],
        [9.0, 10.0, 11.0, 12.0],
    ])
    .unwrap();

    let block = m.sub2d("0:1,2:").unwrap();
    assert_eq!(block.to_rows(), vec![vec![3.0, 4.0], vec![7.0, 8.0]]);

    let block = m.sub2d_mat(":", 1, 1, 1).unwrap();
    assert_eq!(block.to_rows(), vec![vec![2.0], vec![6.0]]);

    // -1 resolves to len - 2
    let block = m.sub2d_mat(":", -1, ":", -1).unwrap();
    assert_eq!(block.shape(), (2, 3));
}

#[test]
fn out_of_bounds_slices_fail_instead_of_padding() {
    let m = eye(3);
    let err = m.sub2d("0:5,:").unwrap_err();
    assert!(matches!(err, MatrixError::RangeBounds { len: 3, .. }));
}

#[test]
fn colon_direction_rules() {
    let up: Vec<f64> = colon(0.0, 1.0, 5.0).unwrap().iter().collect();
    assert_eq!(up, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(colon(5.0, 1.0, 0.0).unwrap().is_empty());
    let down: Vec<f64> = colon(5.0, -1.0, 0.0).unwrap().iter().collect();
    assert_eq!(down, vec![5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
}

#[test]
fn diff_and_cumsum_are_inverse_up_to_offset() {
    let v = vec![2.0, -1.0, 4.5, 0.0, 3.0];
    let back: Vec<f64> = diff(cumsum(v.clone()).unwrap()).unwrap().iter().collect();
    assert_eq!(back, v[1..].to_vec());

    let back: Vec<f64> = cumsum(diff(v.clone()).unwrap()).unwrap().iter().collect();
    let expected: Vec<f64> = v[1..].iter().map(|x| x - v[0]).collect();
    assert_eq!(back, expected);
}

#[test]
fn factories() {
    let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
    assert_eq!(eye(3).matmul(&m).unwrap(), m);
    assert!(zeros(2, 5).iter().all(|v| v == 0.0));
}

#[test]
fn quadratic_roots_in_some_order() {
    let mut r: Vec<f64> = roots(&[1.0, -3.0, 2.0])
        .unwrap()
        .iter()
        .map(Eigenvalue::re)
        .collect();
    r.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(r, vec![1.0, 2.0]);
}

#[test]
fn solvers_agree_on_state_matrix() {
    let a = Matrix::from_rows(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [-6.0, -11.0, -6.0]]).unwrap();
    let mut schur: Vec<f64> = eig_with(&a, &SchurEigenSolver)
        .unwrap()
        .iter()
        .map(Eigenvalue::re)
        .collect();
    let mut qr: Vec<f64> = eig_with(&a, &QrEigenSolver::default())
        .unwrap()
        .iter()
        .map(Eigenvalue::re)
        .collect();
    schur.sort_by(|a, b| a.partial_cmp(b).unwrap());
    qr.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(schur, vec![-3.0, -2.0, -1.0]);
    for (s, q) in schur.iter().zip(&qr) {
        assert!((s - q).abs() < 1e-6);
    }
}

#[test]
fn eig_on_rotation_gives_conjugate_pair() {
    let a = Matrix::from_rows(&[[0.0, -1.0], [1.0, 0.0]]).unwrap();
    let e = eig(&a).unwrap();
    assert_eq!(e.len(), 2);
    assert!(e.iter().all(|v| !v.is_real() && v.re() == 0.0 && v.im().abs() == 1.0));
}
