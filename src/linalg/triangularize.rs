//! Row-wise triangularization of a block by orthogonal (or `J`-orthogonal)
//! transformations applied from the right.
//!
//! Each driver turns `A` into a lower-triangular `L` with `L L' = A A'`
//! (`A J A'` for the mixed variant), working on the leading row of a block
//! that shrinks by one row and one column per step. These are tried
//! speculatively, so failures come back as `false` rather than an error.

use log::debug;

use crate::linalg::{GivensRotation, HouseholderReflection, HyperbolicHouseholder, LinalgError};
use crate::traits::FloatScalar;
use crate::view::MatrixViewMut;

/// Reduces `a` to lower-triangular form with Householder reflections.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::householder_triangularize;
///
/// let a = Matrix::from_rows(2, 3, &[1.0_f64, 2.0, 2.0, 0.0, 3.0, 4.0]);
/// let mut l = a.clone();
/// assert!(householder_triangularize(&mut l.view_mut()));
/// assert!(l[(0, 1)].abs() < 1e-14 && l[(0, 2)].abs() < 1e-14 && l[(1, 2)].abs() < 1e-14);
/// assert!(((&l * &l.transpose()) - &a * &a.transpose()).max_abs() < 1e-12);
/// ```
pub fn householder_triangularize<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>) -> bool {
    match try_householder(a) {
        Ok(()) => true,
        Err(e) => {
            debug!("householder triangularization failed: {}", e);
            false
        }
    }
}

fn try_householder<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>) -> Result<(), LinalgError> {
    let (m, n) = (a.nrows(), a.ncols());
    for k in 0..m.min(n) {
        let mut block = a.extract_mut(k, m - k, k, n - k);
        let h = HouseholderReflection::from(&block.row(0));
        if !h.mu().is_finite() {
            return Err(LinalgError::Singular);
        }
        h.apply_right(&mut block);
        let mut lead = block.row_mut(0);
        lead[0] = h.mu();
        lead.drop_mut(1, 0).set_all(T::zero());
    }
    Ok(())
}

/// Reduces `a` to lower-triangular form with Givens rotations.
pub fn givens_triangularize<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>) -> bool {
    match try_givens(a) {
        Ok(()) => true,
        Err(e) => {
            debug!("givens triangularization failed: {}", e);
            false
        }
    }
}

fn try_givens<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>) -> Result<(), LinalgError> {
    let (m, n) = (a.nrows(), a.ncols());
    for k in 0..m.min(n) {
        let mut block = a.extract_mut(k, m - k, k, n - k);
        for j in 1..block.ncols() {
            let b = block[(0, j)];
            if b == T::zero() {
                continue;
            }
            let g = GivensRotation::new(block[(0, 0)], b);
            if !g.r().is_finite() {
                return Err(LinalgError::Singular);
            }
            g.apply_columns(&mut block, 0, j);
            block[(0, j)] = T::zero();
        }
    }
    Ok(())
}

/// Reduces `a = [A1 | A2]` to `[L | 0]` with `L L' = A1 A1' - A2 A2'`.
///
/// The first `positive` columns form `A1`. Fails (returns `false`) when
/// `A1 A1' - A2 A2'` is not positive definite on the rows reduced so far,
/// which is how a downdate that would lose definiteness is detected.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::mixed_triangularize;
///
/// // [2 | 1]: 4 - 1 = 3
/// let mut a = Matrix::from_rows(1, 2, &[2.0_f64, 1.0]);
/// assert!(mixed_triangularize(&mut a.view_mut(), 1));
/// assert!((a[(0, 0)] - 3.0_f64.sqrt()).abs() < 1e-14);
/// assert_eq!(a[(0, 1)], 0.0);
///
/// let mut bad = Matrix::from_rows(1, 2, &[1.0_f64, 2.0]);
/// assert!(!mixed_triangularize(&mut bad.view_mut(), 1));
/// ```
pub fn mixed_triangularize<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>, positive: usize) -> bool {
    assert!(positive <= a.ncols(), "positive block wider than the matrix");
    match try_mixed(a, positive) {
        Ok(()) => true,
        Err(e) => {
            debug!("mixed triangularization failed: {}", e);
            false
        }
    }
}

fn try_mixed<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>, positive: usize) -> Result<(), LinalgError> {
    let (m, n) = (a.nrows(), a.ncols());
    for k in 0..m.min(positive) {
        let mut block = a.extract_mut(k, m - k, k, n - k);
        let h = HyperbolicHouseholder::new(&block.row(0), positive - k)?;
        h.apply_rows(&mut block);
        let mut lead = block.row_mut(0);
        lead[0] = h.mu();
        lead.drop_mut(1, 0).set_all(T::zero());
        if h.mu() < T::zero() {
            block.column_mut(0).chs();
        }
    }
    if m > positive && n > positive {
        // rows beyond the positive block cannot be reduced further
        let rest = a.extract_mut(positive, m - positive, positive, n - positive);
        if !rest.is_zero(T::zero()) {
            return Err(LinalgError::CholeskyFailed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    fn gram(a: &Matrix<f64>) -> Matrix<f64> {
        a * &a.transpose()
    }

    fn is_lower(l: &Matrix<f64>) -> bool {
        for i in 0..l.nrows() {
            for j in i + 1..l.ncols() {
                if l[(i, j)] != 0.0 {
                    return false;
                }
            }
        }
        true
    }

    fn sample() -> Matrix<f64> {
        Matrix::from_rows(3, 4, &[
            2.0_f64, -1.0, 0.5, 3.0,
            1.0, 4.0, -2.0, 0.0,
            0.0, 1.5, 1.0, -1.0,
        ])
    }

    #[test]
    fn householder_preserves_gram_matrix() {
        let a = sample();
        let mut l = a.clone();
        assert!(householder_triangularize(&mut l.view_mut()));
        assert!(is_lower(&l));
        assert!((gram(&l) - gram(&a)).max_abs() < 1e-12);
    }

    #[test]
    fn givens_preserves_gram_matrix() {
        let a = sample();
        let mut l = a.clone();
        assert!(givens_triangularize(&mut l.view_mut()));
        assert!(is_lower(&l));
        assert!((gram(&l) - gram(&a)).max_abs() < 1e-12);
    }

    #[test]
    fn drivers_work_on_a_block() {
        let mut m = Matrix::<f64>::zeros(5, 6);
        m.sub_matrix_mut(1, 3, 2, 4).copy_from(&sample().view());
        assert!(givens_triangularize(&mut m.sub_matrix_mut(1, 3, 2, 4)));
        let l = m.sub_matrix(1, 3, 2, 4).to_matrix();
        assert!(is_lower(&l));
        assert!((gram(&l) - gram(&sample())).max_abs() < 1e-12);
        assert_eq!(m.row(0).sum(), 0.0);
    }

    #[test]
    fn non_finite_input_reports_failure() {
        let mut a = Matrix::from_rows(1, 2, &[f64::NAN, 1.0]);
        assert!(!householder_triangularize(&mut a.view_mut()));
        let mut b = Matrix::from_rows(1, 2, &[f64::INFINITY, 1.0]);
        assert!(!givens_triangularize(&mut b.view_mut()));
    }

    #[test]
    fn mixed_downdates() {
        // A1 well conditioned, A2 small
        let a1 = Matrix::from_rows(3, 3, &[4.0_f64, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0]);
        let a2 = Matrix::from_rows(3, 2, &[0.5_f64, 0.1, -0.3, 0.2, 0.1, 0.4]);
        let mut a = Matrix::zeros(3, 5);
        a.sub_matrix_mut(0, 3, 0, 3).copy_from(&a1.view());
        a.sub_matrix_mut(0, 3, 3, 2).copy_from(&a2.view());
        assert!(mixed_triangularize(&mut a.view_mut(), 3));
        let l = a.sub_matrix(0, 3, 0, 3).to_matrix();
        assert!(is_lower(&l));
        assert!(a.sub_matrix(0, 3, 3, 2).is_zero(0.0));
        let expected = gram(&a1) - gram(&a2);
        assert!((gram(&l) - expected).max_abs() < 1e-12);
        assert!(l.diag().iter().all(|d| d > 0.0));
    }

    #[test]
    fn mixed_fails_when_definiteness_is_lost() {
        let mut a = Matrix::from_rows(2, 3, &[1.0_f64, 0.0, 0.5, 0.0, 1.0, 3.0]);
        assert!(!mixed_triangularize(&mut a.view_mut(), 2));
    }
}
