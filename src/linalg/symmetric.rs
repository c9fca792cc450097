//! Symmetric and positive-definite matrices: Cholesky factorization,
//! normal-equation products and quadratic forms.

use alloc::vec::Vec;

use log::debug;

use crate::datablock::DataBlockMut;
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::triangular::lower;
use crate::linalg::{default_epsilon, GivensRotation, HyperbolicRotation, LinalgError};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::view::{MatrixView, MatrixViewMut};
use crate::Matrix;

// ── Cholesky ────────────────────────────────────────────────────────

/// Left-looking elimination shared by the Cholesky routines.
///
/// A pivot above `floor` is accepted. With `zero = Some(z)`, a pivot in
/// `[-z, z]` whose sub-column residuals are all within `z` yields a zero
/// column; anything else fails.
fn cholesky_lower<T: FloatScalar>(
    a: &mut MatrixViewMut<'_, T>,
    floor: T,
    zero: Option<T>,
) -> Result<(), LinalgError> {
    if !a.is_square() {
        return Err(LinalgError::SquareOnly);
    }
    let n = a.nrows();
    for j in 0..n {
        // a[j.., j] -= L[j, k] * L[j.., k] for the columns already done
        for k in 0..j {
            let ljk = a[(j, k)];
            if ljk != T::zero() {
                a.extract_mut(j, n - j, 0, n).add_scaled_column(j, k, -ljk);
            }
        }

        let d = a[(j, j)];
        if d > floor {
            let ljj = d.sqrt();
            a[(j, j)] = ljj;
            a.column_mut(j).drop_mut(j + 1, 0).scale(T::one() / ljj);
            continue;
        }
        match zero {
            Some(z) if d.abs() <= z && a.column(j).drop(j + 1, 0).is_zero(z) => {
                debug!("cholesky: zero pivot in column {}", j);
                a.column_mut(j).drop_mut(j, 0).set_all(T::zero());
            }
            _ => return Err(LinalgError::CholeskyFailed),
        }
    }
    for j in 1..n {
        a.column_mut(j).extract_mut(0, j, 1).set_all(T::zero());
    }
    Ok(())
}

/// In-place lower Cholesky factor of a symmetric positive-definite matrix.
///
/// Only the lower triangle of `a` is read. On success `a` holds `L` with
/// `L L' = A` and zeros above the diagonal. A non-positive pivot fails with
/// [`LinalgError::CholeskyFailed`], leaving `a` partially overwritten.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::symmetric::lcholesky;
///
/// let mut a = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 5.0]);
/// lcholesky(&mut a.view_mut()).unwrap();
/// assert_eq!(a.as_slice(), &[2.0, 1.0, 0.0, 2.0]);
/// ```
pub fn lcholesky<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>) -> Result<(), LinalgError> {
    cholesky_lower(a, T::zero(), None)
}

/// Cholesky factor of a positive semi-definite matrix.
///
/// Pivots within `[-zero, zero]` produce a zero column of `L`, provided the
/// rest of that column is within `zero` as well; the matrix is then
/// singular but still `L L' = A` up to `zero`.
pub fn lcholesky_with_zero<T: FloatScalar>(a: &mut MatrixViewMut<'_, T>, zero: T) -> Result<(), LinalgError> {
    cholesky_lower(a, zero, Some(zero))
}

/// `true` when the Cholesky factorization of `a` succeeds. `a` is untouched.
pub fn is_positive_definite<T: FloatScalar>(a: &MatrixView<'_, T>) -> bool {
    let mut work = a.to_matrix();
    lcholesky(&mut work.view_mut()).is_ok()
}

/// Replaces `L` by the factor of `L L' + x x'`. `x` is overwritten.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::symmetric::lcholesky_update;
///
/// let mut l = Matrix::<f64>::identity(2);
/// let mut x = [3.0, 0.0];
/// lcholesky_update(&mut l.view_mut(), &mut x);
/// // diag(10, 1)
/// assert!((l[(0, 0)] - 10.0_f64.sqrt()).abs() < 1e-14);
/// ```
pub fn lcholesky_update<T: FloatScalar>(l: &mut MatrixViewMut<'_, T>, x: &mut [T]) {
    let n = x.len();
    assert!(l.is_square() && l.nrows() == n, "dimension mismatch: factor and update vector");
    for k in 0..n {
        let g = GivensRotation::new(l[(k, k)], x[k]);
        for i in k..n {
            let (a, b) = g.apply(l[(i, k)], x[i]);
            l[(i, k)] = a;
            x[i] = b;
        }
    }
}

/// Replaces `L` by the factor of `L L' - x x'`. `x` is overwritten.
///
/// Fails with [`LinalgError::CholeskyFailed`] when the result would not be
/// positive definite; `l` is then partially updated.
pub fn lcholesky_downdate<T: FloatScalar>(l: &mut MatrixViewMut<'_, T>, x: &mut [T]) -> Result<(), LinalgError> {
    let n = x.len();
    assert!(l.is_square() && l.nrows() == n, "dimension mismatch: factor and downdate vector");
    for k in 0..n {
        let h = HyperbolicRotation::new(l[(k, k)], x[k])?;
        for i in k..n {
            let (a, b) = h.apply(l[(i, k)], x[i]);
            l[(i, k)] = a;
            x[i] = b;
        }
    }
    Ok(())
}

// ── Products ────────────────────────────────────────────────────────

/// `X' X`.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::symmetric::xtx;
///
/// let x = Matrix::from_rows(3, 2, &[1.0_f64, 1.0, 1.0, 2.0, 1.0, 3.0]);
/// let p = xtx(&x);
/// assert_eq!(p.as_slice(), &[3.0, 6.0, 6.0, 14.0]);
/// ```
pub fn xtx<T: FloatScalar>(x: &impl MatrixRef<T>) -> Matrix<T> {
    let (m, n) = (x.nrows(), x.ncols());
    let mut p = Matrix::zeros(n, n);
    for j in 0..n {
        for i in j..n {
            let mut s = T::zero();
            for k in 0..m {
                s = s + *x.get(k, i) * *x.get(k, j);
            }
            p[(i, j)] = s;
            p[(j, i)] = s;
        }
    }
    p
}

/// `X X'`.
pub fn xxt<T: FloatScalar>(x: &impl MatrixRef<T>) -> Matrix<T> {
    let (m, n) = (x.nrows(), x.ncols());
    let mut p = Matrix::zeros(m, m);
    for j in 0..m {
        for i in j..m {
            let mut s = T::zero();
            for k in 0..n {
                s = s + *x.get(i, k) * *x.get(j, k);
            }
            p[(i, j)] = s;
            p[(j, i)] = s;
        }
    }
    p
}

/// `x' S x`.
pub fn quadratic_form<T: FloatScalar>(s: &impl MatrixRef<T>, x: &[T]) -> T {
    let n = x.len();
    assert!(s.nrows() == n && s.ncols() == n, "dimension mismatch: quadratic form");
    let mut q = T::zero();
    for j in 0..n {
        let mut sj = T::zero();
        for i in 0..n {
            sj = sj + x[i] * *s.get(i, j);
        }
        q = q + sj * x[j];
    }
    q
}

/// `X S X'`, symmetric by construction.
pub fn quadratic_form_matrix<T: FloatScalar>(s: &impl MatrixRef<T>, x: &impl MatrixRef<T>) -> Matrix<T> {
    let (m, n) = (x.nrows(), x.ncols());
    assert!(s.nrows() == n && s.ncols() == n, "dimension mismatch: quadratic form");
    // rows of X S
    let xs = Matrix::from_fn(m, n, |i, j| {
        (0..n).fold(T::zero(), |acc, k| acc + *x.get(i, k) * *s.get(k, j))
    });
    let mut p = Matrix::zeros(m, m);
    for j in 0..m {
        for i in j..m {
            let v = (0..n).fold(T::zero(), |acc, k| acc + xs[(i, k)] * *x.get(j, k));
            p[(i, j)] = v;
            p[(j, i)] = v;
        }
    }
    p
}

/// Averages `a[i, j]` and `a[j, i]`.
pub fn reinforce_symmetry<T: FloatScalar>(a: &mut impl MatrixMut<T>) {
    let n = a.nrows();
    assert!(n == a.ncols(), "symmetry needs a square matrix");
    let half = T::lit(0.5);
    for j in 0..n {
        for i in j + 1..n {
            let v = (*a.get(i, j) + *a.get(j, i)) * half;
            *a.get_mut(i, j) = v;
            *a.get_mut(j, i) = v;
        }
    }
}

/// Solves `S x = b` for a positive-definite `S`.
pub fn solve<T: FloatScalar>(s: &Matrix<T>, b: &[T]) -> Result<Vec<T>, LinalgError> {
    CholeskyDecomposition::new(s)?.solve(b)
}

/// `S^-1` for a positive-definite `S`.
pub fn inverse<T: FloatScalar>(s: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    let mut inv = CholeskyDecomposition::new(s)?.inverse()?;
    reinforce_symmetry(&mut inv);
    Ok(inv)
}

// ── CholeskyDecomposition ───────────────────────────────────────────

/// Cholesky decomposition `A = L L'` of a symmetric positive-definite
/// matrix.
///
/// A pivot at or below `epsilon` fails the decomposition.
///
/// # Example
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::{CholeskyDecomposition, LinearSystemSolver};
///
/// let a = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let chol = CholeskyDecomposition::new(&a).unwrap();
///
/// let x = chol.solve(&[8.0, 7.0]).unwrap();
/// assert!((x[0] - 1.25).abs() < 1e-12 && (x[1] - 1.5).abs() < 1e-12);
/// assert!((chol.det().unwrap() - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T> {
    l: Matrix<T>,
    epsilon: T,
    decomposed: bool,
}

impl<T: FloatScalar> Default for CholeskyDecomposition<T> {
    fn default() -> Self {
        Self {
            l: Matrix::zeros(0, 0),
            epsilon: default_epsilon(),
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> CholeskyDecomposition<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut chol = Self::default();
        chol.decompose(a)?;
        Ok(chol)
    }

    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn set_epsilon(&mut self, epsilon: T) {
        self.epsilon = epsilon;
    }

    pub fn epsilon(&self) -> T {
        self.epsilon
    }

    /// Decomposes `a` in its own buffer.
    pub fn decompose_owned(&mut self, mut a: Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        cholesky_lower(&mut a.view_mut(), self.epsilon, None)?;
        self.l = a;
        self.decomposed = true;
        Ok(())
    }

    /// Lower-triangular factor, zeros above the diagonal.
    pub fn l(&self) -> &Matrix<T> {
        &self.l
    }

    /// `det(A) = prod(diag(L))^2`.
    pub fn det(&self) -> Result<T, LinalgError> {
        if !self.decomposed {
            return Err(LinalgError::NotDecomposed);
        }
        let p = self.l.diag().iter().fold(T::one(), |acc, d| acc * d);
        Ok(p * p)
    }

    /// `ln det(A)`, without the overflow of [`det`](Self::det).
    pub fn ln_det(&self) -> Result<T, LinalgError> {
        if !self.decomposed {
            return Err(LinalgError::NotDecomposed);
        }
        let s = self.l.diag().iter().fold(T::zero(), |acc, d| acc + d.ln());
        Ok(T::lit(2.0) * s)
    }

    /// Turns the factor of `A` into the factor of `A + x x'`.
    pub fn update(&mut self, x: &[T]) -> Result<(), LinalgError> {
        check_rhs(self, x.len())?;
        let mut work = x.to_vec();
        lcholesky_update(&mut self.l.view_mut(), &mut work);
        Ok(())
    }

    /// Turns the factor of `A` into the factor of `A - x x'`.
    ///
    /// On failure the previous factor is kept.
    pub fn downdate(&mut self, x: &[T]) -> Result<(), LinalgError> {
        check_rhs(self, x.len())?;
        let mut work = x.to_vec();
        let mut l = self.l.clone();
        lcholesky_downdate(&mut l.view_mut(), &mut work)?;
        self.l = l;
        Ok(())
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for CholeskyDecomposition<T> {
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError> {
        self.decompose_owned(a.clone())
    }

    fn is_decomposed(&self) -> bool {
        self.decomposed
    }

    fn equations_count(&self) -> usize {
        self.l.nrows()
    }

    fn unknowns_count(&self) -> usize {
        self.l.ncols()
    }

    fn is_full_rank(&self) -> bool {
        self.decomposed
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        let l = self.l.view();
        // L y = b, then L' x = y (that is x L = y)
        lower::rsolve(&l, b, T::zero())?;
        lower::lsolve(&l, b, T::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd() -> Matrix<f64> {
        Matrix::from_rows(3, 3, &[4.0_f64, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0])
    }

    #[test]
    fn classic_factor() {
        let mut a = spd();
        lcholesky(&mut a.view_mut()).unwrap();
        let expected = Matrix::from_rows(3, 3, &[2.0_f64, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
        assert!(a.distance(&expected) < 1e-12);
    }

    #[test]
    fn only_lower_triangle_is_read() {
        let mut a = spd();
        a[(0, 2)] = 1e6;
        lcholesky(&mut a.view_mut()).unwrap();
        assert_eq!(a[(0, 2)], 0.0);
        assert!((&a * &a.transpose()).distance(&spd()) < 1e-10);
    }

    #[test]
    fn works_on_a_block() {
        let mut big = Matrix::<f64>::fill(5, 5, 7.0);
        big.sub_matrix_mut(1, 3, 2, 3).copy_from(&spd().view());
        lcholesky(&mut big.sub_matrix_mut(1, 3, 2, 3)).unwrap();
        assert!((big[(3, 4)] - 3.0).abs() < 1e-12);
        assert_eq!(big[(0, 0)], 7.0);
    }

    #[test]
    fn indefinite_fails() {
        let mut a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 1.0]);
        assert_eq!(lcholesky(&mut a.view_mut()), Err(LinalgError::CholeskyFailed));
        let mut wide = Matrix::<f64>::zeros(2, 3);
        assert_eq!(lcholesky(&mut wide.view_mut()), Err(LinalgError::SquareOnly));
    }

    #[test]
    fn positive_definiteness_check_is_non_destructive() {
        let a = spd();
        assert!(is_positive_definite(&a.view()));
        assert_eq!(a, spd());
        // eigenvalues 3 and -1
        let b = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 1.0]);
        assert!(!is_positive_definite(&b.view()));
    }

    #[test]
    fn semi_definite_with_zero_tolerance() {
        // rank 2: third row is the sum of the first two
        let x = Matrix::from_rows(3, 2, &[1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let s = xxt(&x);
        let mut strict = s.clone();
        assert_eq!(lcholesky(&mut strict.view_mut()), Err(LinalgError::CholeskyFailed));

        let mut l = s.clone();
        lcholesky_with_zero(&mut l.view_mut(), 1e-12).unwrap();
        assert!(l.column(2).is_zero(0.0));
        assert!((&l * &l.transpose()).distance(&s) < 1e-12);
    }

    #[test]
    fn zero_pivot_with_inconsistent_column_fails() {
        // zero diagonal but non-zero off-diagonal: indefinite
        let mut a = Matrix::from_rows(2, 2, &[0.0_f64, 1.0, 1.0, 1.0]);
        assert_eq!(lcholesky_with_zero(&mut a.view_mut(), 1e-12), Err(LinalgError::CholeskyFailed));
    }

    #[test]
    fn products_and_forms() {
        let x = Matrix::from_rows(3, 2, &[1.0_f64, 2.0, 0.0, 1.0, -1.0, 3.0]);
        let direct = &x.transpose() * &x;
        assert!(xtx(&x).distance(&direct) < 1e-14);
        assert!(xxt(&x).distance(&(&x * &x.transpose())) < 1e-14);
        // the views implement the same access trait
        assert_eq!(xtx(&x.view().transpose()), xxt(&x));

        let s = spd();
        let v = [1.0, -1.0, 0.5];
        let sv = s.times_vec(&v);
        let expected: f64 = v.iter().zip(sv.iter()).map(|(a, b)| a * b).sum();
        assert!((quadratic_form(&s, &v) - expected).abs() < 1e-12);

        let q = quadratic_form_matrix(&s, &Matrix::from_rows(1, 3, &v));
        assert!((q[(0, 0)] - expected).abs() < 1e-12);
        let w = Matrix::from_rows(2, 3, &[1.0_f64, 0.0, 2.0, 0.0, 1.0, -1.0]);
        let full = &(&w * &s) * &w.transpose();
        assert!(quadratic_form_matrix(&s, &w).distance(&full) < 1e-12);
    }

    #[test]
    fn symmetry_is_reinforced() {
        let mut a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 4.0, 1.0]);
        reinforce_symmetry(&mut a);
        assert_eq!(a[(0, 1)], 3.0);
        assert_eq!(a[(1, 0)], 3.0);
        let mut b = Matrix::from_rows(3, 3, &[1.0_f64, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 4.0, 1.0]);
        reinforce_symmetry(&mut b.sub_matrix_mut(1, 2, 1, 2));
        assert_eq!(b[(1, 2)], 2.0);
        assert_eq!(b[(1, 0)], 2.0);
    }

    #[test]
    fn engine_solves_and_inverts() {
        let a = spd();
        let chol = CholeskyDecomposition::new(&a).unwrap();
        assert!((chol.det().unwrap() - 36.0).abs() < 1e-9);
        assert!((chol.ln_det().unwrap() - 36.0_f64.ln()).abs() < 1e-12);
        let x = [1.0, 2.0, 3.0];
        let b = a.times_vec(&x);
        let got = chol.solve(&b).unwrap();
        for (g, e) in got.iter().zip(x.iter()) {
            assert!((g - e).abs() < 1e-9);
        }
        let inv = inverse(&a).unwrap();
        assert!(inv.is_symmetric(0.0));
        assert!((&a * &inv).distance(&Matrix::identity(3)) < 1e-9);
        let y = solve(&a, &b).unwrap();
        assert!((y[2] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn engine_respects_epsilon() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 0.0, 0.0, 1e-10]);
        assert!(CholeskyDecomposition::new(&a).is_ok());
        let mut chol = CholeskyDecomposition::default().with_epsilon(1e-8);
        assert_eq!(chol.decompose(&a), Err(LinalgError::CholeskyFailed));
        assert_eq!(chol.det(), Err(LinalgError::NotDecomposed));
    }

    #[test]
    fn rank_one_update_and_downdate() {
        let a = spd();
        let x = [1.0, -2.0, 0.5];
        let mut chol = CholeskyDecomposition::new(&a).unwrap();
        chol.update(&x).unwrap();
        let mut outer = Matrix::zeros(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                outer[(i, j)] = x[i] * x[j];
            }
        }
        let updated = &a + &outer;
        let l = chol.l().clone();
        assert!((&l * &l.transpose()).distance(&updated) < 1e-10);
        assert!(l.diag().iter().all(|d| d > 0.0));

        chol.downdate(&x).unwrap();
        let l = chol.l().clone();
        assert!((&l * &l.transpose()).distance(&a) < 1e-10);

        // removing more than is there
        let before = chol.l().clone();
        assert_eq!(chol.downdate(&[3.0, 0.0, 0.0]), Err(LinalgError::CholeskyFailed));
        assert_eq!(chol.l(), &before);
    }
}
