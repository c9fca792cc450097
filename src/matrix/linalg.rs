use alloc::vec::Vec;

use crate::linalg::{
    moore_penrose, CholeskyDecomposition, HouseholderQr, LinalgError, LinearSystemSolver, LuDecomposition,
};
use crate::traits::FloatScalar;

use super::Matrix;

impl<T: FloatScalar> Matrix<T> {
    /// LU decomposition with partial pivoting.
    pub fn lu(&self) -> Result<LuDecomposition<T>, LinalgError> {
        LuDecomposition::new(self)
    }

    /// Householder QR, dropping negligible columns.
    pub fn qr(&self) -> Result<HouseholderQr<T>, LinalgError> {
        HouseholderQr::new(self)
    }

    /// Cholesky decomposition (`A = L L'`).
    pub fn cholesky(&self) -> Result<CholeskyDecomposition<T>, LinalgError> {
        CholeskyDecomposition::new(self)
    }

    /// Solves `A x = b` via LU decomposition.
    ///
    /// ```
    /// use densela::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 5.0, 3.0]);
    /// let x = a.solve(&[4.0, 11.0]).unwrap();
    /// assert!((x[0] - 1.0).abs() < 1e-12);
    /// assert!((x[1] - 2.0).abs() < 1e-12);
    /// ```
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, LinalgError> {
        self.lu()?.solve(b)
    }

    /// Matrix inverse via LU decomposition.
    ///
    /// ```
    /// use densela::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[4.0_f64, 7.0, 2.0, 6.0]);
    /// let id = &a * &a.inverse().unwrap();
    /// assert!((id[(0, 0)] - 1.0).abs() < 1e-12);
    /// assert!(id[(0, 1)].abs() < 1e-12);
    /// ```
    pub fn inverse(&self) -> Result<Matrix<T>, LinalgError> {
        self.lu()?.inverse()
    }

    /// Determinant. A matrix that LU finds singular has determinant zero.
    ///
    /// ```
    /// use densela::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[4.0_f64, 3.0, 6.0, 3.0]);
    /// assert!((a.det().unwrap() + 6.0).abs() < 1e-12);
    /// assert_eq!(Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]).det(), Ok(0.0));
    /// ```
    pub fn det(&self) -> Result<T, LinalgError> {
        match self.lu() {
            Ok(lu) => lu.determinant(),
            Err(LinalgError::Singular) => Ok(T::zero()),
            Err(e) => Err(e),
        }
    }

    /// Moore-Penrose pseudo-inverse.
    pub fn pinv(&self) -> Result<Matrix<T>, LinalgError> {
        moore_penrose(self)
    }
}
