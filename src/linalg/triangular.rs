//! In-place products and solves with triangular matrices.
//!
//! Naming, for a triangular `T` and a vector `x`:
//!
//! | function | operation        |
//! |----------|------------------|
//! | `rsolve` | solve `T x = b`  |
//! | `lsolve` | solve `x T = b`  |
//! | `lmul`   | `x := T x`       |
//! | `rmul`   | `x := x T`       |
//!
//! Only the relevant triangle of `T` is read. Solves take a `zero`
//! tolerance: at a pivot with `|d| <= zero`, the unknown is set to 0 when
//! the remaining residual is also within `zero`, and the solve fails with
//! [`LinalgError::Singular`] otherwise. A rank-deficient but consistent
//! system therefore gets a solution with zeros in the free positions.
//!
//! The upper routines run the lower ones on a transposed view.

use crate::datablock::DataBlockMut;
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::view::{MatrixView, MatrixViewMut};
use crate::Matrix;

fn check_system<T>(t: &MatrixView<'_, T>, len: usize) -> Result<(), LinalgError> {
    if !t.is_square() {
        return Err(LinalgError::SquareOnly);
    }
    if t.nrows() != len {
        return Err(LinalgError::IncompatibleDimensions);
    }
    Ok(())
}

/// `r / d` under the zero-tolerance policy.
#[inline]
fn divide<T: FloatScalar>(r: T, d: T, zero: T) -> Result<T, LinalgError> {
    if d.abs() > zero {
        Ok(r / d)
    } else if r.abs() > zero {
        Err(LinalgError::Singular)
    } else {
        Ok(T::zero())
    }
}

pub mod lower {
    use super::*;

    /// Solves `L x = b` by forward substitution. `b` is overwritten by `x`.
    ///
    /// ```
    /// use densela::{DynVector, Matrix};
    /// use densela::linalg::triangular::lower;
    ///
    /// let l = Matrix::from_rows(2, 2, &[2.0_f64, 0.0, 1.0, 4.0]);
    /// let mut b = DynVector::from_slice(&[4.0_f64, 10.0]);
    /// lower::rsolve(&l.view(), &mut b.block_mut(), 0.0).unwrap();
    /// assert_eq!(b.as_slice(), &[2.0, 2.0]);
    /// ```
    pub fn rsolve<T: FloatScalar>(
        l: &MatrixView<'_, T>,
        b: &mut DataBlockMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        check_system(l, b.len())?;
        for i in 0..b.len() {
            let r = b[i] - l.row(i).extract(0, i, 1).dot(&b.as_view().extract(0, i, 1));
            b[i] = divide(r, l[(i, i)], zero)?;
        }
        Ok(())
    }

    /// Solves `x L = b` (that is `L' x' = b'`) by back substitution.
    pub fn lsolve<T: FloatScalar>(
        l: &MatrixView<'_, T>,
        b: &mut DataBlockMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        check_system(l, b.len())?;
        let n = b.len();
        for i in (0..n).rev() {
            let r = b[i] - l.column(i).drop(i + 1, 0).dot(&b.as_view().drop(i + 1, 0));
            b[i] = divide(r, l[(i, i)], zero)?;
        }
        Ok(())
    }

    /// `x := L x`.
    pub fn lmul<T: FloatScalar>(l: &MatrixView<'_, T>, x: &mut DataBlockMut<'_, T>) {
        assert!(l.is_square() && l.nrows() == x.len(), "dimension mismatch");
        for i in (0..x.len()).rev() {
            x[i] = l.row(i).extract(0, i + 1, 1).dot(&x.as_view().extract(0, i + 1, 1));
        }
    }

    /// `x := x L`.
    pub fn rmul<T: FloatScalar>(l: &MatrixView<'_, T>, x: &mut DataBlockMut<'_, T>) {
        assert!(l.is_square() && l.nrows() == x.len(), "dimension mismatch");
        for j in 0..x.len() {
            x[j] = l.column(j).drop(j, 0).dot(&x.as_view().drop(j, 0));
        }
    }

    /// Solves `L X = B` column by column.
    pub fn rsolve_matrix<T: FloatScalar>(
        l: &MatrixView<'_, T>,
        b: &mut MatrixViewMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        for j in 0..b.ncols() {
            rsolve(l, &mut b.column_mut(j), zero)?;
        }
        Ok(())
    }

    /// Solves `X L = B` row by row.
    pub fn lsolve_matrix<T: FloatScalar>(
        l: &MatrixView<'_, T>,
        b: &mut MatrixViewMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        for i in 0..b.nrows() {
            lsolve(l, &mut b.row_mut(i), zero)?;
        }
        Ok(())
    }

    /// `L^-1`, lower triangular.
    pub fn inverse<T: FloatScalar>(l: &MatrixView<'_, T>, zero: T) -> Result<Matrix<T>, LinalgError> {
        if !l.is_square() {
            return Err(LinalgError::SquareOnly);
        }
        let mut inv = Matrix::identity(l.nrows());
        rsolve_matrix(l, &mut inv.view_mut(), zero)?;
        Ok(inv)
    }
}

pub mod upper {
    use super::*;

    /// Solves `U x = b` by back substitution.
    ///
    /// ```
    /// use densela::{DynVector, Matrix};
    /// use densela::linalg::triangular::upper;
    ///
    /// let u = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 0.0, 4.0]);
    /// let mut b = DynVector::from_slice(&[4.0_f64, 8.0]);
    /// upper::rsolve(&u.view(), &mut b.block_mut(), 0.0).unwrap();
    /// assert_eq!(b.as_slice(), &[1.0, 2.0]);
    /// ```
    pub fn rsolve<T: FloatScalar>(
        u: &MatrixView<'_, T>,
        b: &mut DataBlockMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        lower::lsolve(&u.transpose(), b, zero)
    }

    /// Solves `x U = b`.
    pub fn lsolve<T: FloatScalar>(
        u: &MatrixView<'_, T>,
        b: &mut DataBlockMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        lower::rsolve(&u.transpose(), b, zero)
    }

    /// `x := U x`.
    pub fn lmul<T: FloatScalar>(u: &MatrixView<'_, T>, x: &mut DataBlockMut<'_, T>) {
        lower::rmul(&u.transpose(), x)
    }

    /// `x := x U`.
    pub fn rmul<T: FloatScalar>(u: &MatrixView<'_, T>, x: &mut DataBlockMut<'_, T>) {
        lower::lmul(&u.transpose(), x)
    }

    /// Solves `U X = B` column by column.
    pub fn rsolve_matrix<T: FloatScalar>(
        u: &MatrixView<'_, T>,
        b: &mut MatrixViewMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        for j in 0..b.ncols() {
            rsolve(u, &mut b.column_mut(j), zero)?;
        }
        Ok(())
    }

    /// Solves `X U = B` row by row.
    pub fn lsolve_matrix<T: FloatScalar>(
        u: &MatrixView<'_, T>,
        b: &mut MatrixViewMut<'_, T>,
        zero: T,
    ) -> Result<(), LinalgError> {
        for i in 0..b.nrows() {
            lsolve(u, &mut b.row_mut(i), zero)?;
        }
        Ok(())
    }

    /// `U^-1`, upper triangular.
    pub fn inverse<T: FloatScalar>(u: &MatrixView<'_, T>, zero: T) -> Result<Matrix<T>, LinalgError> {
        if !u.is_square() {
            return Err(LinalgError::SquareOnly);
        }
        let mut inv = Matrix::identity(u.nrows());
        rsolve_matrix(u, &mut inv.view_mut(), zero)?;
        Ok(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DynVector;

    fn l3() -> Matrix<f64> {
        Matrix::from_rows(3, 3, &[2.0_f64, 9.0, 9.0, -1.0, 3.0, 9.0, 0.5, 4.0, -2.0])
    }

    fn close(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn rsolve_undoes_lmul() {
        let l = l3();
        let x = [1.0, -2.0, 0.5];
        let mut v = DynVector::from_slice(&x);
        lower::lmul(&l.view(), &mut v.block_mut());
        // only the lower triangle is read
        assert!(close(v.as_slice(), &[2.0, -7.0, -8.5], 1e-14));
        lower::rsolve(&l.view(), &mut v.block_mut(), 0.0).unwrap();
        assert!(close(v.as_slice(), &x, 1e-14));
    }

    #[test]
    fn lsolve_undoes_rmul() {
        let l = l3();
        let x = [0.3, 1.0, -4.0];
        let mut v = DynVector::from_slice(&x);
        lower::rmul(&l.view(), &mut v.block_mut());
        lower::lsolve(&l.view(), &mut v.block_mut(), 0.0).unwrap();
        assert!(close(v.as_slice(), &x, 1e-14));
    }

    #[test]
    fn upper_via_transposed_view() {
        let u = Matrix::from_rows(3, 3, &[2.0_f64, -1.0, 0.5, 0.0, 3.0, 4.0, 0.0, 0.0, -2.0]);
        let x = [1.5, 2.0, -1.0];
        let mut v = DynVector::from_slice(&x);
        upper::lmul(&u.view(), &mut v.block_mut());
        assert!(close(v.as_slice(), &[0.5, 2.0, 2.0], 1e-14));
        upper::rsolve(&u.view(), &mut v.block_mut(), 0.0).unwrap();
        assert!(close(v.as_slice(), &x, 1e-14));

        let mut w = DynVector::from_slice(&x);
        upper::rmul(&u.view(), &mut w.block_mut());
        assert!(close(w.as_slice(), &[3.0, 4.5, 10.75], 1e-14));
        upper::lsolve(&u.view(), &mut w.block_mut(), 0.0).unwrap();
        assert!(close(w.as_slice(), &x, 1e-14));
    }

    #[test]
    fn zero_pivot_with_consistent_residual_gives_zero() {
        // second equation: 1 * x0 + 0 * x1 = 1, satisfied by x0 = 1
        let l = Matrix::from_rows(3, 3, &[1.0_f64, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 1.0, 1.0]);
        let mut b = DynVector::from_slice(&[1.0_f64, 1.0, 5.0]);
        lower::rsolve(&l.view(), &mut b.block_mut(), 1e-12).unwrap();
        assert_eq!(b.as_slice(), &[1.0, 0.0, 3.0]);
    }

    #[test]
    fn zero_pivot_with_inconsistent_residual_is_singular() {
        let l = Matrix::from_rows(2, 2, &[1.0_f64, 0.0, 1.0, 0.0]);
        let mut b = DynVector::from_slice(&[1.0_f64, 2.0]);
        assert_eq!(
            lower::rsolve(&l.view(), &mut b.block_mut(), 1e-12),
            Err(LinalgError::Singular)
        );
    }

    #[test]
    fn tolerance_decides_between_snap_and_failure() {
        let l = Matrix::from_rows(2, 2, &[1.0_f64, 0.0, 1.0, 1e-10]);
        // residual 1e-9 at a pivot of 1e-10
        let b = [1.0, 1.0 + 1e-9];
        let mut loose = DynVector::from_slice(&b);
        lower::rsolve(&l.view(), &mut loose.block_mut(), 1e-8).unwrap();
        assert_eq!(loose[1], 0.0);
        let mut strict = DynVector::from_slice(&b);
        lower::rsolve(&l.view(), &mut strict.block_mut(), 1e-11).unwrap();
        assert!((strict[1] - 10.0).abs() < 1e-4);
        let mut between = DynVector::from_slice(&b);
        assert_eq!(
            lower::rsolve(&l.view(), &mut between.block_mut(), 5e-10),
            Err(LinalgError::Singular)
        );
    }

    #[test]
    fn matrix_right_hand_sides_and_inverse() {
        let l = l3();
        let inv = lower::inverse(&l.view(), 0.0).unwrap();
        let mut prod = Matrix::<f64>::zeros(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                let mut s = 0.0;
                for k in 0..=i {
                    s += l[(i, k)] * inv[(k, j)];
                }
                prod[(i, j)] = s;
            }
        }
        assert!((prod - Matrix::identity(3)).max_abs() < 1e-14);
        assert_eq!(inv[(0, 2)], 0.0);

        let mut b = Matrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let orig = b.clone();
        lower::lsolve_matrix(&l.view(), &mut b.view_mut(), 0.0).unwrap();
        for i in 0..2 {
            let mut row = DynVector::from_block(&b.row(i));
            lower::rmul(&l.view(), &mut row.block_mut());
            assert!(close(row.as_slice(), &orig.row(i).to_vec(), 1e-13));
        }
    }

    #[test]
    fn shape_errors() {
        let l = Matrix::<f64>::zeros(2, 3);
        let mut b = DynVector::zeros(2);
        assert_eq!(lower::rsolve(&l.view(), &mut b.block_mut(), 0.0), Err(LinalgError::SquareOnly));
        let sq = Matrix::<f64>::identity(3);
        assert_eq!(
            upper::rsolve(&sq.view(), &mut b.block_mut(), 0.0),
            Err(LinalgError::IncompatibleDimensions)
        );
    }
}
