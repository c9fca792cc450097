use alloc::vec::Vec;

use log::debug;

use crate::datablock::DataBlockMut;
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::triangular::upper;
use crate::linalg::{default_epsilon, HouseholderReflection, LinalgError};
use crate::traits::FloatScalar;
use crate::Matrix;

use super::{apply_qt, negligible, thin_q, upper_part, LeastSquares};

/// Householder QR with column pivoting, `A P = Q R`.
///
/// At each step the remaining column with the largest residual norm is
/// brought forward. A column whose recomputed residual turns out to be
/// negligible is cycled to the end of the free block and the block shrinks
/// by one, so after the decomposition `pivot()[..rank]` are the columns
/// actually used (in pivot order) and `pivot()[rank..]` the negligible
/// ones, in the order they were found.
///
/// Column norms are downdated between steps and recomputed when
/// cancellation makes the downdate unreliable.
///
/// Requires at least as many rows as columns.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::PivotedQr;
///
/// let a = Matrix::from_rows(3, 3, &[
///     1.0_f64, 10.0, 2.0,
///     1.0, 20.0, 2.0,
///     1.0, 30.0, 2.0,
/// ]);
/// let qr = PivotedQr::default().with_epsilon(1e-10).factor(&a).unwrap();
/// // the large column goes first, the multiple of column 0 is cycled out
/// assert_eq!(qr.pivot()[0], 1);
/// assert_eq!(qr.rank(), 2);
/// assert_eq!(qr.unused().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PivotedQr<T> {
    qr: Matrix<T>,
    betas: Vec<T>,
    pivot: Vec<usize>,
    rank: usize,
    epsilon: T,
    decomposed: bool,
}

impl<T: FloatScalar> Default for PivotedQr<T> {
    fn default() -> Self {
        Self {
            qr: Matrix::zeros(0, 0),
            betas: Vec::new(),
            pivot: Vec::new(),
            rank: 0,
            epsilon: default_epsilon(),
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> PivotedQr<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        Self::default().factor(a)
    }

    pub fn factor(mut self, a: &Matrix<T>) -> Result<Self, LinalgError> {
        self.decompose(a)?;
        Ok(self)
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

    /// Decomposes `a`, reusing its buffer for the packed factors.
    pub fn decompose_owned(&mut self, a: Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        let (m, n) = (a.nrows(), a.ncols());
        if m < n {
            return Err(LinalgError::IncompatibleDimensions);
        }
        self.qr = a;
        self.betas.clear();
        self.pivot = (0..n).collect();

        // [downdated residual norms, norms at the last recomputation, original norms]
        let first: Vec<T> = (0..n).map(|j| self.qr.column(j).nrm2()).collect();
        let mut norms = [first.clone(), first.clone(), first];
        let tol = T::epsilon().sqrt();

        let mut nfree = n;
        let mut k = 0;
        while k < nfree {
            let p = k + (k..nfree)
                .fold((0, T::neg_infinity()), |best, j| {
                    if norms[0][j] > best.1 {
                        (j - k, norms[0][j])
                    } else {
                        best
                    }
                })
                .0;
            if p != k {
                self.swap(k, p, &mut norms);
            }

            let norm = self.qr.column(k).drop(k, 0).nrm2();
            if negligible(norm, norms[2][k], self.epsilon) {
                debug!(
                    "pivoted qr: column {} is negligible (residual norm {:?}), moved to position {}",
                    self.pivot[k],
                    norm,
                    nfree - 1
                );
                for j in k..nfree - 1 {
                    self.swap(j, j + 1, &mut norms);
                }
                nfree -= 1;
                continue;
            }

            let h = HouseholderReflection::in_place(&mut self.qr.column_mut(k).drop_mut(k, 0));
            for j in (k + 1)..n {
                h.transform(&mut self.qr.column_mut(j).drop_mut(k, 0));
            }
            self.betas.push(h.beta());

            // downdate the free columns by the entry moved into row k
            let [vn1, vn2, _] = &mut norms;
            for j in (k + 1)..nfree {
                if vn1[j] == T::zero() {
                    continue;
                }
                let t = self.qr[(k, j)].abs() / vn1[j];
                let t = (T::one() - t * t).max(T::zero());
                let ratio = vn1[j] / vn2[j];
                if t * ratio * ratio <= tol {
                    vn1[j] = self.qr.column(j).drop(k + 1, 0).nrm2();
                    vn2[j] = vn1[j];
                } else {
                    vn1[j] = vn1[j] * t.sqrt();
                }
            }
            k += 1;
        }
        self.rank = k;
        if k < n {
            debug!("pivoted qr: rank {} of {} columns", k, n);
        }
        self.decomposed = true;
        Ok(())
    }

    fn swap(&mut self, i: usize, j: usize, norms: &mut [Vec<T>; 3]) {
        self.qr.swap_columns(i, j);
        self.pivot.swap(i, j);
        for v in norms.iter_mut() {
            v.swap(i, j);
        }
    }

    /// Column order: column `i` of `A P` is column `pivot()[i]` of `A`.
    pub fn pivot(&self) -> &[usize] {
        &self.pivot
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Original indices of the negligible columns.
    pub fn unused(&self) -> &[usize] {
        &self.pivot[self.rank..]
    }

    /// `rank x n` upper-trapezoidal factor, columns in pivot order.
    pub fn r(&self) -> Matrix<T> {
        upper_part(&self.qr, self.rank, self.qr.ncols())
    }

    /// Diagonal of `R`, non-increasing in magnitude up to rounding.
    pub fn r_diagonal(&self) -> Vec<T> {
        (0..self.rank).map(|i| self.qr[(i, i)]).collect()
    }

    /// `m x rank` matrix with orthonormal columns.
    pub fn q(&self) -> Matrix<T> {
        thin_q(&self.qr, &self.betas)
    }

    /// Basic least-squares solution: the unused columns get zero
    /// coefficients.
    pub fn least_squares(&self, b: &[T]) -> Result<LeastSquares<T>, LinalgError> {
        check_rhs(self, b.len())?;
        let r = self.rank;
        let mut y = b.to_vec();
        let mut yb = DataBlockMut::from_slice(&mut y);
        apply_qt(&self.qr, &self.betas, &mut yb);
        upper::rsolve(&self.qr.sub_matrix(0, r, 0, r), &mut yb.drop_mut(0, b.len() - r), T::zero())?;

        let mut coefficients = alloc::vec![T::zero(); self.qr.ncols()];
        for (i, &j) in self.pivot[..r].iter().enumerate() {
            coefficients[j] = y[i];
        }
        Ok(LeastSquares {
            coefficients,
            residuals: y.split_off(r),
        })
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for PivotedQr<T> {
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
        self.decomposed && self.rank == self.qr.ncols()
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        if !self.is_full_rank() {
            return Err(LinalgError::RankError);
        }
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        apply_qt(&self.qr, &self.betas, b);
        upper::rsolve(&self.qr.sub_matrix(0, n, 0, n), &mut b.drop_mut(0, m - n), T::zero())?;
        let z: Vec<T> = (0..n).map(|i| b[i]).collect();
        for (i, &j) in self.pivot.iter().enumerate() {
            b[j] = z[i];
        }
        Ok(())
    }
}
