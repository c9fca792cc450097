use alloc::vec::Vec;

use log::debug;

use crate::datablock::DataBlockMut;
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::triangular::upper;
use crate::linalg::{default_epsilon, HouseholderReflection, LinalgError};
use crate::traits::FloatScalar;
use crate::Matrix;

use super::{apply_qt, negligible, thin_q, upper_part, LeastSquares};

/// Householder QR that drops negligible columns.
///
/// Columns are reduced left to right. A column whose residual norm (the
/// part not explained by the columns already kept) is negligible is
/// skipped and listed in [`unused`](Self::unused); the kept columns are
/// packed to the left, so `A[:, used] = Q R` with `R` square of size
/// `rank`.
///
/// Requires at least as many rows as columns.
///
/// # Example
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::HouseholderQr;
///
/// // third column = first + second
/// let a = Matrix::from_rows(4, 3, &[
///     1.0_f64, 0.0, 1.0,
///     1.0, 1.0, 2.0,
///     1.0, 2.0, 3.0,
///     1.0, 3.0, 4.0,
/// ]);
/// let qr = HouseholderQr::default().with_epsilon(1e-10).factor(&a).unwrap();
/// assert_eq!(qr.rank(), 2);
/// assert_eq!(qr.unused(), &[2]);
///
/// let ls = qr.least_squares(&[1.0, 3.0, 5.0, 7.0]).unwrap();
/// assert!((ls.coefficients[0] - 1.0).abs() < 1e-12);
/// assert!((ls.coefficients[1] - 2.0).abs() < 1e-12);
/// assert_eq!(ls.coefficients[2], 0.0);
/// assert!(ls.ssq() < 1e-20);
/// ```
#[derive(Debug, Clone)]
pub struct HouseholderQr<T> {
    qr: Matrix<T>,
    betas: Vec<T>,
    used: Vec<usize>,
    unused: Vec<usize>,
    epsilon: T,
    decomposed: bool,
}

impl<T: FloatScalar> Default for HouseholderQr<T> {
    fn default() -> Self {
        Self {
            qr: Matrix::zeros(0, 0),
            betas: Vec::new(),
            used: Vec::new(),
            unused: Vec::new(),
            epsilon: default_epsilon(),
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> HouseholderQr<T> {
    /// Decomposes `a` with the default tolerance.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        Self::default().factor(a)
    }

    /// Decomposes `a` and returns the engine, for builder-style chains.
    pub fn factor(mut self, a: &Matrix<T>) -> Result<Self, LinalgError> {
        self.decompose(a)?;
        Ok(self)
    }

    /// A column is negligible when its residual norm is at most
    /// `epsilon * max(1, original norm)`.
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

    /// Decomposes `a`, reusing its buffer for the packed factors.
    pub fn decompose_owned(&mut self, a: Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        let (m, n) = (a.nrows(), a.ncols());
        if m < n {
            return Err(LinalgError::IncompatibleDimensions);
        }
        self.qr = a;
        self.betas.clear();
        self.used.clear();
        self.unused.clear();

        let norms: Vec<T> = (0..n).map(|j| self.qr.column(j).nrm2()).collect();
        let mut k = 0;
        for j in 0..n {
            if j != k {
                self.qr.swap_columns(k, j);
            }
            let norm = self.qr.column(k).drop(k, 0).nrm2();
            if negligible(norm, norms[j], self.epsilon) {
                debug!("householder qr: column {} is negligible (residual norm {:?})", j, norm);
                self.unused.push(j);
                continue;
            }
            let h = HouseholderReflection::in_place(&mut self.qr.column_mut(k).drop_mut(k, 0));
            for jj in (k + 1)..n {
                h.transform(&mut self.qr.column_mut(jj).drop_mut(k, 0));
            }
            self.betas.push(h.beta());
            self.used.push(j);
            k += 1;
        }
        if k < n {
            debug!("householder qr: rank {} of {} columns", k, n);
        }
        self.decomposed = true;
        Ok(())
    }

    /// Number of columns kept.
    pub fn rank(&self) -> usize {
        self.used.len()
    }

    /// Original indices of the kept columns, in order.
    pub fn used(&self) -> &[usize] {
        &self.used
    }

    /// Original indices of the negligible columns.
    pub fn unused(&self) -> &[usize] {
        &self.unused
    }

    /// `rank x rank` upper-triangular factor.
    pub fn r(&self) -> Matrix<T> {
        upper_part(&self.qr, self.rank(), self.rank())
    }

    /// Diagonal of `R`.
    pub fn r_diagonal(&self) -> Vec<T> {
        (0..self.rank()).map(|i| self.qr[(i, i)]).collect()
    }

    /// `m x rank` matrix with orthonormal columns.
    pub fn q(&self) -> Matrix<T> {
        thin_q(&self.qr, &self.betas)
    }

    /// Least-squares fit of `b` on the kept columns.
    ///
    /// Coefficients of the unused columns are zero. The residuals are the
    /// trailing `m - rank` entries of `Q' b`.
    pub fn least_squares(&self, b: &[T]) -> Result<LeastSquares<T>, LinalgError> {
        check_rhs(self, b.len())?;
        let r = self.rank();
        let mut y = b.to_vec();
        let mut yb = DataBlockMut::from_slice(&mut y);
        apply_qt(&self.qr, &self.betas, &mut yb);
        upper::rsolve(&self.qr.sub_matrix(0, r, 0, r), &mut yb.drop_mut(0, b.len() - r), T::zero())?;

        let mut coefficients = alloc::vec![T::zero(); self.qr.ncols()];
        for (i, &j) in self.used.iter().enumerate() {
            coefficients[j] = y[i];
        }
        Ok(LeastSquares {
            coefficients,
            residuals: y.split_off(r),
        })
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for HouseholderQr<T> {
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError> {
        self.decompose_owned(a.clone())
    }

    fn is_decomposed(&self) -> bool {
        self.decomposed
    }

    fn equations_count(&self) -> usize {
        self.qr.nrows()
    }

    fn unknowns_count(&self) -> usize {
        self.qr.ncols()
    }

    fn is_full_rank(&self) -> bool {
        self.decomposed && self.unused.is_empty()
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        if !self.is_full_rank() {
            return Err(LinalgError::RankError);
        }
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        apply_qt(&self.qr, &self.betas, b);
        upper::rsolve(&self.qr.sub_matrix(0, n, 0, n), &mut b.drop_mut(0, m - n), T::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tall() -> Matrix<f64> {
        Matrix::from_rows(5, 3, &[
            2.0_f64, -1.0, 0.5,
            1.0, 3.0, -2.0,
            0.0, 1.0, 4.0,
            -1.0, 2.0, 1.0,
            3.0, 0.0, -1.0,
        ])
    }

    #[test]
    fn q_times_r_reproduces_a() {
        let a = tall();
        let qr = HouseholderQr::new(&a).unwrap();
        assert_eq!(qr.rank(), 3);
        assert!(qr.unused().is_empty());
        let q = qr.q();
        assert!((&q.transpose() * &q).distance(&Matrix::identity(3)) < 1e-14);
        assert!((&q * &qr.r()).distance(&a) < 1e-13);
        let diag = qr.r_diagonal();
        assert!(diag.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn least_squares_matches_normal_equations() {
        let a = tall();
        let b = [1.0, 2.0, -1.0, 0.5, 3.0];
        let ls = HouseholderQr::new(&a).unwrap().least_squares(&b).unwrap();

        let ata = &a.transpose() * &a;
        let atb = a.transpose().times_vec(&b);
        let x = crate::linalg::LuDecomposition::new(&ata).unwrap().solve(&atb).unwrap();
        for (c, e) in ls.coefficients.iter().zip(x.iter()) {
            assert!((c - e).abs() < 1e-12);
        }

        let fitted = a.times_vec(&ls.coefficients);
        let rss: f64 = fitted.iter().zip(b.iter()).map(|(f, y)| (y - f) * (y - f)).sum();
        assert_eq!(ls.residuals.len(), 2);
        assert!((ls.ssq() - rss).abs() < 1e-12);
    }

    #[test]
    fn zero_column_is_dropped() {
        let mut a = tall();
        a.column_mut(1).set_all(0.0);
        let qr = HouseholderQr::new(&a).unwrap();
        assert_eq!(qr.rank(), 2);
        assert_eq!(qr.used(), &[0, 2]);
        assert_eq!(qr.unused(), &[1]);
        assert!(!qr.is_full_rank());
        assert_eq!(qr.solve(&[0.0; 5]), Err(LinalgError::RankError));
        assert_eq!(qr.inverse(), Err(LinalgError::SquareOnly));

        // the kept columns are still factored exactly
        let kept = a.select_columns(qr.used());
        assert!((&qr.q() * &qr.r()).distance(&kept) < 1e-13);
    }

    #[test]
    fn square_solve_and_inverse() {
        let a = Matrix::from_rows(3, 3, &[4.0_f64, 1.0, 2.0, 1.0, 5.0, 3.0, 2.0, 3.0, 6.0]);
        let qr = HouseholderQr::new(&a).unwrap();
        let x = qr.solve(&[7.0, 9.0, 11.0]).unwrap();
        let back = a.times_vec(&x);
        assert!((back[0] - 7.0).abs() < 1e-12 && (back[1] - 9.0).abs() < 1e-12 && (back[2] - 11.0).abs() < 1e-12);
        let inv = qr.inverse().unwrap();
        assert!((&inv * &a).distance(&Matrix::identity(3)) < 1e-12);
    }

    #[test]
    fn wide_matrix_is_rejected() {
        let mut qr = HouseholderQr::<f64>::default();
        assert_eq!(qr.decompose(&Matrix::zeros(2, 3)), Err(LinalgError::IncompatibleDimensions));
        assert_eq!(qr.least_squares(&[1.0, 2.0]), Err(LinalgError::NotDecomposed));
    }
}
