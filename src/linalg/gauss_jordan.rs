//! Gauss-Jordan elimination on an augmented system `[A | B]`.
//!
//! Rows are processed in order and each one picks its pivot among the
//! columns not used yet, so a matrix with many structural zeros keeps
//! them. Fill-in below `1e-15` is dropped as it appears.

use alloc::vec::Vec;

use log::debug;

use crate::datablock::DataBlockMut;
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Smallest admissible pivot.
const PIVOT_EPSILON: f64 = 1e-13;
/// Coefficients below this are set to zero during elimination.
const COEFFICIENT_EPSILON: f64 = 1e-15;

/// Solves `A X = B` in place, `B` receiving `X`.
///
/// `a` is destroyed. Returns `false`, leaving both matrices in an
/// unspecified state, when some row has no pivot above `1e-13` in the
/// columns still available.
///
/// # Panics
///
/// If `a` is not square or `b` does not have as many rows as `a`.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::gauss_jordan;
///
/// let mut a = Matrix::from_rows(2, 2, &[0.0_f64, 2.0, 1.0, 1.0]);
/// let mut b = Matrix::column_vector(&[4.0_f64, 3.0]);
/// assert!(gauss_jordan(&mut a, &mut b));
/// assert_eq!(b.as_slice(), &[1.0, 2.0]);
///
/// let mut singular = Matrix::from_rows(2, 2, &[1.0_f64, 1.0, 1.0, 1.0]);
/// assert!(!gauss_jordan(&mut singular, &mut Matrix::column_vector(&[1.0_f64, 2.0])));
/// ```
pub fn gauss_jordan<T: FloatScalar>(a: &mut Matrix<T>, b: &mut Matrix<T>) -> bool {
    let n = a.nrows();
    assert!(a.is_square(), "gauss-jordan needs a square system");
    assert!(b.nrows() == n, "dimension mismatch: right-hand side has {} rows, expected {}", b.nrows(), n);
    let pivot_eps = T::lit(PIVOT_EPSILON);
    let coef_eps = T::lit(COEFFICIENT_EPSILON);

    let mut used = alloc::vec![false; n];
    // column of the pivot chosen in each row
    let mut pivots = Vec::with_capacity(n);
    for r in 0..n {
        let best = (0..n)
            .filter(|&c| !used[c])
            .map(|c| (c, a[(r, c)].abs()))
            .fold(None, |best: Option<(usize, T)>, (c, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((c, v)),
            });
        let c = match best {
            Some((c, v)) if v >= pivot_eps => c,
            _ => {
                debug!("gauss-jordan: no pivot in row {}", r);
                return false;
            }
        };
        used[c] = true;
        pivots.push(c);

        let p = T::one() / a[(r, c)];
        a.row_mut(r).scale(p);
        b.row_mut(r).scale(p);
        a[(r, c)] = T::one();

        for i in (0..n).filter(|&i| i != r) {
            let f = a[(i, c)];
            if f.abs() <= coef_eps {
                a[(i, c)] = T::zero();
                continue;
            }
            a.view_mut().add_scaled_row(i, r, -f);
            b.view_mut().add_scaled_row(i, r, -f);
            a[(i, c)] = T::zero();
            a.row_mut(i).apply(|x| if x.abs() < coef_eps { T::zero() } else { x });
        }
    }

    // row r now reads x[pivots[r]] = b[r]
    let solved = b.clone();
    for (r, &c) in pivots.iter().enumerate() {
        b.row_mut(c).copy_from(&solved.row(r));
    }
    true
}

/// Linear solver that keeps the inverse computed by [`gauss_jordan`].
///
/// Pivot thresholds are fixed (`1e-13` on pivots, `1e-15` on fill-in);
/// there is no tolerance to configure.
#[derive(Debug, Clone)]
pub struct GaussJordanSolver<T> {
    inverse: Matrix<T>,
    decomposed: bool,
}

impl<T: FloatScalar> Default for GaussJordanSolver<T> {
    fn default() -> Self {
        Self {
            inverse: Matrix::zeros(0, 0),
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> GaussJordanSolver<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut s = Self::default();
        s.decompose(a)?;
        Ok(s)
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for GaussJordanSolver<T> {
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        if !a.is_square() {
            return Err(LinalgError::SquareOnly);
        }
        let mut work = a.clone();
        let mut inv = Matrix::identity(a.nrows());
        if !gauss_jordan(&mut work, &mut inv) {
            return Err(LinalgError::Singular);
        }
        self.inverse = inv;
        self.decomposed = true;
        Ok(())
    }

    fn is_decomposed(&self) -> bool {
        self.decomposed
    }

    fn equations_count(&self) -> usize {
        self.inverse.nrows()
    }

    fn unknowns_count(&self) -> usize {
        self.inverse.ncols()
    }

    fn is_full_rank(&self) -> bool {
        self.decomposed
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        let x = self.inverse.view().times_vec(&b.as_view());
        b.copy_from(&x.block());
        Ok(())
    }

    fn inverse(&self) -> Result<Matrix<T>, LinalgError> {
        if !self.decomposed {
            return Err(LinalgError::NotDecomposed);
        }
        Ok(self.inverse.clone())
    }
}
