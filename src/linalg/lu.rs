use alloc::vec::Vec;

use log::trace;

use crate::datablock::{DataBlock, DataBlockMut};
use crate::linalg::solver::{check_rhs, LinearSystemSolver};
use crate::linalg::{default_epsilon, LinalgError};
use crate::traits::FloatScalar;
use crate::Matrix;

/// Elimination order used by [`LuDecomposition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LuAlgorithm {
    /// Right-looking Gaussian elimination: pivot, scale the column, then
    /// update the trailing block.
    #[default]
    Gauss,
    /// Left-looking Crout-Doolittle: each column is finished with dot
    /// products against the columns already factored, then pivoted.
    CroutDoolittle,
}

/// Gaussian elimination with partial pivoting, in place.
///
/// On return `a` holds `U` on and above the diagonal and the multipliers
/// of the unit lower factor below it. `pivot[i]` is the original row now at
/// row `i`. Returns the sign of the permutation.
fn gauss_in_place<T: FloatScalar>(a: &mut Matrix<T>, pivot: &mut [usize], eps: T) -> Result<T, LinalgError> {
    let n = a.nrows();
    let mut sign = T::one();
    for col in 0..n {
        // Partial pivoting: row with the largest modulus in this column
        let p = col + a.column(col).drop(col, 0).max_abs_index().unwrap_or(0);
        if !(a[(p, col)].abs() >= eps) {
            return Err(LinalgError::Singular);
        }
        if p != col {
            trace!("lu: column {} pivots on row {}", col, p);
            a.swap_rows(col, p);
            pivot.swap(col, p);
            sign = -sign;
        }

        let inv_pivot = T::one() / a[(col, col)];
        a.column_mut(col).drop_mut(col + 1, 0).scale(inv_pivot);

        // Rank-1 update: a[col+1.., j] -= a[col, j] * a[col+1.., col]
        for j in (col + 1)..n {
            let f = a[(col, j)];
            if f != T::zero() {
                a.sub_matrix_mut(col + 1, n - col - 1, 0, n)
                    .add_scaled_column(j, col, -f);
            }
        }
    }
    Ok(sign)
}

/// Crout-Doolittle elimination, in place, same packed layout as
/// [`gauss_in_place`].
fn crout_in_place<T: FloatScalar>(a: &mut Matrix<T>, pivot: &mut [usize], eps: T) -> Result<T, LinalgError> {
    let n = a.nrows();
    let mut sign = T::one();
    for j in 0..n {
        // apply the previous transformations to column j
        for i in 0..n {
            let k = i.min(j);
            let s = a.row(i).extract(0, k, 1).dot(&a.column(j).extract(0, k, 1));
            a[(i, j)] = a[(i, j)] - s;
        }

        let p = j + a.column(j).drop(j, 0).max_abs_index().unwrap_or(0);
        if p != j {
            trace!("lu: column {} pivots on row {}", j, p);
            a.swap_rows(j, p);
            pivot.swap(j, p);
            sign = -sign;
        }

        let d = a[(j, j)];
        if !(d.abs() >= eps) {
            return Err(LinalgError::Singular);
        }
        a.column_mut(j).drop_mut(j + 1, 0).scale(T::one() / d);
    }
    Ok(sign)
}

/// LU decomposition with partial pivoting, `P A = L U`.
///
/// The packed factors live in one buffer: `U` on and above the diagonal,
/// the strictly lower part of the unit-diagonal `L` below it. `P` is
/// recorded as the row order [`pivot`](Self::pivot).
///
/// # Example
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::{LinearSystemSolver, LuDecomposition};
///
/// let a = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 5.0, 3.0]);
/// let lu = LuDecomposition::new(&a).unwrap();
///
/// let x = lu.solve(&[4.0, 11.0]).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
///
/// assert!((lu.determinant().unwrap() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    lu: Matrix<T>,
    pivot: Vec<usize>,
    pivot_sign: T,
    epsilon: T,
    algorithm: LuAlgorithm,
    decomposed: bool,
}

impl<T: FloatScalar> Default for LuDecomposition<T> {
    fn default() -> Self {
        Self {
            lu: Matrix::zeros(0, 0),
            pivot: Vec::new(),
            pivot_sign: T::one(),
            epsilon: default_epsilon(),
            algorithm: LuAlgorithm::Gauss,
            decomposed: false,
        }
    }
}

impl<T: FloatScalar> LuDecomposition<T> {
    /// Decomposes `a` with Gaussian elimination and the default tolerance.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut lu = Self::default();
        lu.decompose(a)?;
        Ok(lu)
    }

    pub fn with_algorithm(mut self, algorithm: LuAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Pivots smaller than `epsilon` in magnitude make the matrix singular.
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

    pub fn algorithm(&self) -> LuAlgorithm {
        self.algorithm
    }

    /// Decomposes `a`, reusing its buffer for the packed factors.
    pub fn decompose_owned(&mut self, a: Matrix<T>) -> Result<(), LinalgError> {
        self.decomposed = false;
        if !a.is_square() {
            return Err(LinalgError::SquareOnly);
        }
        let n = a.nrows();
        self.lu = a;
        self.pivot = (0..n).collect();
        let sign = match self.algorithm {
            LuAlgorithm::Gauss => gauss_in_place(&mut self.lu, &mut self.pivot, self.epsilon),
            LuAlgorithm::CroutDoolittle => crout_in_place(&mut self.lu, &mut self.pivot, self.epsilon),
        }?;
        self.pivot_sign = sign;
        self.decomposed = true;
        Ok(())
    }

    /// Unit lower-triangular factor.
    pub fn l(&self) -> Matrix<T> {
        let n = self.lu.nrows();
        Matrix::from_fn(n, n, |i, j| {
            if i > j {
                self.lu[(i, j)]
            } else if i == j {
                T::one()
            } else {
                T::zero()
            }
        })
    }

    /// Upper-triangular factor.
    pub fn u(&self) -> Matrix<T> {
        let n = self.lu.nrows();
        Matrix::from_fn(n, n, |i, j| if i <= j { self.lu[(i, j)] } else { T::zero() })
    }

    /// Row order of `P A`: row `i` of `L U` is row `pivot()[i]` of `A`.
    pub fn pivot(&self) -> &[usize] {
        &self.pivot
    }

    /// `+1` for an even number of row exchanges, `-1` otherwise.
    pub fn pivot_sign(&self) -> T {
        self.pivot_sign
    }

    /// `det(A) = pivot_sign * prod(diag(U))`.
    pub fn determinant(&self) -> Result<T, LinalgError> {
        if !self.decomposed {
            return Err(LinalgError::NotDecomposed);
        }
        Ok(self.lu.diag().iter().fold(self.pivot_sign, |acc, d| acc * d))
    }
}

impl<T: FloatScalar> LinearSystemSolver<T> for LuDecomposition<T> {
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError> {
        self.decompose_owned(a.clone())
    }

    fn is_decomposed(&self) -> bool {
        self.decomposed
    }

    fn equations_count(&self) -> usize {
        self.lu.nrows()
    }

    fn unknowns_count(&self) -> usize {
        self.lu.ncols()
    }

    fn is_full_rank(&self) -> bool {
        // a successful decomposition has every pivot at least epsilon in magnitude
        self.decomposed
    }

    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.len())?;
        let n = b.len();
        let mut x: Vec<T> = self.pivot.iter().map(|&p| b[p]).collect();

        // forward substitution through the unit L; leading zeros stay zero
        let Some(first) = x.iter().position(|v| *v != T::zero()) else {
            b.set_all(T::zero());
            return Ok(());
        };
        for i in (first + 1)..n {
            let s = self
                .lu
                .row(i)
                .extract(first, i - first, 1)
                .dot(&DataBlock::from_slice(&x[first..i]));
            x[i] = x[i] - s;
        }

        // back substitution through U; unknowns past the last non-zero are zero
        let last = x.iter().rposition(|v| *v != T::zero()).unwrap_or(0);
        for i in (0..=last).rev() {
            let s = self
                .lu
                .row(i)
                .extract(i + 1, last - i, 1)
                .dot(&DataBlock::from_slice(&x[i + 1..=last]));
            x[i] = (x[i] - s) / self.lu[(i, i)];
        }

        b.copy_from_slice(&x);
        Ok(())
    }
}
