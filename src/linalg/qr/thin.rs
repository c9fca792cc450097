use alloc::vec::Vec;

use log::debug;

use crate::datablock::{DataBlock, DataBlockMut};
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::triangular::upper;
use crate::linalg::{default_epsilon, HouseholderReflection, LinalgError};
use crate::traits::FloatScalar;
use crate::Matrix;

use super::{negligible, thin_q, upper_part, LeastSquares};

/// Economy QR of a full-rank tall matrix, `A = Q R` with explicit `m x n`
/// `Q` and square `R`.
///
/// No pivoting and no column removal: a negligible column fails the
/// decomposition with [`LinalgError::RankError`].
#[derive(Debug, Clone)]
pub struct ThinQr<T> {
    q: Matrix<T>,
    r: Matrix<T>,
    epsilon: T,
    decomposed: bool,
}

impl<T: FloatScalar> Default for ThinQr<T> {
    fn default() -> Self {
        Self {
            q: Matrix::zeros(0, 0),
            r: Matrix::zeros(0, 0),
            epsilon: default_epsilon(),
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> ThinQr<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut qr = Self::default();
        qr.decompose(a)?;
        Ok(qr)
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

    pub fn q(&self) -> &Matrix<T> {
        &self.q
    }

    pub fn r(&self) -> &Matrix<T> {
        &self.r
    }

    /// Least-squares fit of `b`. The residuals are `b - A x`, in the
    /// original coordinates.
    pub fn least_squares(&self, b: &[T]) -> Result<LeastSquares<T>, LinalgError> {
        check_rhs(self, b.len())?;
        let bb = DataBlock::from_slice(b);
        let mut coefficients: Vec<T> = self.q.view().columns().map(|c| c.dot(&bb)).collect();
        // residual b - Q Q' b, before the triangular solve
        let mut residuals = b.to_vec();
        for (j, &c) in coefficients.iter().enumerate() {
            DataBlockMut::from_slice(&mut residuals).add_scaled(-c, &self.q.column(j));
        }
        upper::rsolve(&self.r.view(), &mut DataBlockMut::from_slice(&mut coefficients), T::zero())?;
        Ok(LeastSquares {
            coefficients,
            residuals,
        })
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for ThinQr<T> {
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        let (m, n) = (a.nrows(), a.ncols());
        if m < n {
            return Err(LinalgError::IncompatibleDimensions);
        }
        let mut work = a.clone();
        let mut betas = Vec::with_capacity(n);
        for k in 0..n {
            let norm = work.column(k).drop(k, 0).nrm2();
            if negligible(norm, a.column(k).nrm2(), self.epsilon) {
                debug!("thin qr: column {} is negligible", k);
                return Err(LinalgError::RankError);
            }
            let h = HouseholderReflection::in_place(&mut work.column_mut(k).drop_mut(k, 0));
            for j in (k + 1)..n {
                h.transform(&mut work.column_mut(j).drop_mut(k, 0));
            }
            betas.push(h.beta());
        }
        self.r = upper_part(&work, n, n);
        self.q = thin_q(&work, &betas);
        self.decomposed = true;
        Ok(())
    }

    fn is_decomposed(&self) -> bool {
        self.decomposed
    }

    fn equations_count(&self) -> usize {
        self.q.nrows()
    }

    fn unknowns_count(&self) -> usize {
        self.q.ncols()
    }

    fn is_full_rank(&self) -> bool {
        self.decomposed
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        let mut y: Vec<T> = self.q.view().columns().map(|c| c.dot(&b.as_view())).collect();
        upper::rsolve(&self.r.view(), &mut DataBlockMut::from_slice(&mut y), T::zero())?;
        b.drop_mut(0, b.len() - y.len()).copy_from_slice(&y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design() -> Matrix<f64> {
        // intercept and slope over six points
        Matrix::from_fn(6, 2, |i, j| if j == 0 { 1.0 } else { i as f64 })
    }

    #[test]
    fn explicit_factors() {
        let a = design();
        let qr = ThinQr::new(&a).unwrap();
        assert_eq!((qr.q().nrows(), qr.q().ncols()), (6, 2));
        assert!((&qr.q().transpose() * qr.q()).distance(&Matrix::identity(2)) < 1e-14);
        assert!((qr.q() * qr.r()).distance(&a) < 1e-13);
        assert_eq!(qr.r()[(1, 0)], 0.0);
    }

    #[test]
    fn fits_a_line() {
        let a = design();
        let b = [1.1, 2.9, 5.2, 7.0, 8.8, 11.1];
        let ls = ThinQr::new(&a).unwrap().least_squares(&b).unwrap();
        // closed-form simple regression
        let n = 6.0;
        let sx: f64 = (0..6).map(|i| i as f64).sum();
        let sxx: f64 = (0..6).map(|i| (i * i) as f64).sum();
        let sy: f64 = b.iter().sum();
        let sxy: f64 = b.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
        let slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
        let intercept = (sy - slope * sx) / n;
        assert!((ls.coefficients[1] - slope).abs() < 1e-12);
        assert!((ls.coefficients[0] - intercept).abs() < 1e-12);

        let fitted = a.times_vec(&ls.coefficients);
        for i in 0..6 {
            assert!((ls.residuals[i] - (b[i] - fitted[i])).abs() < 1e-12);
        }

        // solve agrees with the least-squares coefficients
        let x = ThinQr::new(&a).unwrap().solve(&b).unwrap();
        assert!((x[0] - intercept).abs() < 1e-12 && (x[1] - slope).abs() < 1e-12);
    }

    #[test]
    fn rank_deficient_input_fails() {
        let mut a = design();
        a.column_mut(1).set_all(2.0);
        let mut qr = ThinQr::default().with_epsilon(1e-10);
        assert_eq!(qr.decompose(&a), Err(LinalgError::RankError));
        assert!(!qr.is_decomposed());
        assert_eq!(qr.solve(&[0.0; 6]), Err(LinalgError::NotDecomposed));
    }
}
