//! Householder QR engines.
//!
//! [`HouseholderQr`] and [`PivotedQr`] pack their factors the same way: `R`
//! on and above the diagonal, and below the diagonal of column `k` the tail
//! of reflector `k` (whose leading entry is an implicit 1). Only the
//! reflector scalars `beta` are kept on the side. [`ThinQr`] forms an
//! explicit `Q` instead.

mod householder;
mod pivoted;
mod thin;

pub use householder::HouseholderQr;
pub use pivoted::PivotedQr;
pub use thin::ThinQr;

use alloc::vec::Vec;

use crate::datablock::DataBlockMut;
use crate::linalg::householder::reflect;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Result of a least-squares solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares<T> {
    /// One coefficient per column of the decomposed matrix.
    pub coefficients: Vec<T>,
    /// Components of the right-hand side outside the column space of `A`.
    /// Their squares sum to the residual sum of squares.
    pub residuals: Vec<T>,
}

impl<T: FloatScalar> LeastSquares<T> {
    /// Residual sum of squares.
    pub fn ssq(&self) -> T {
        self.residuals.iter().fold(T::zero(), |acc, &r| acc + r * r)
    }
}

/// `b := Q' b` for the first `betas.len()` packed reflectors of `qr`.
pub(crate) fn apply_qt<T: FloatScalar>(qr: &Matrix<T>, betas: &[T], b: &mut DataBlockMut<'_, T>) {
    for (k, &beta) in betas.iter().enumerate() {
        let tail = qr.column(k).drop(k + 1, 0);
        reflect(&tail, beta, &mut b.drop_mut(k, 0));
    }
}

/// Leading `m x r` block of `Q`, with `r = betas.len()`.
pub(crate) fn thin_q<T: FloatScalar>(qr: &Matrix<T>, betas: &[T]) -> Matrix<T> {
    let (m, r) = (qr.nrows(), betas.len());
    let mut q = Matrix::zeros(m, r);
    for j in 0..r {
        q[(j, j)] = T::one();
    }
    // Q = H_0 H_1 ... H_{r-1}, applied from the innermost reflector out
    for k in (0..r).rev() {
        let tail = qr.column(k).drop(k + 1, 0);
        for j in k..r {
            reflect(&tail, betas[k], &mut q.column_mut(j).drop_mut(k, 0));
        }
    }
    q
}

/// Upper triangle of the leading `rows x cols` block of `qr`.
pub(crate) fn upper_part<T: FloatScalar>(qr: &Matrix<T>, rows: usize, cols: usize) -> Matrix<T> {
    Matrix::from_fn(rows, cols, |i, j| if i <= j { qr[(i, j)] } else { T::zero() })
}

/// Residual threshold for a column whose norm was `norm0` before reduction.
#[inline]
pub(crate) fn negligible<T: FloatScalar>(norm: T, norm0: T, eps: T) -> bool {
    !(norm > eps * norm0.max(T::one()))
}
