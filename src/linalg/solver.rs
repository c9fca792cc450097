use alloc::vec::Vec;

use crate::datablock::DataBlockMut;
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::view::MatrixViewMut;
use crate::Matrix;

/// Common contract of the decomposition engines.
///
/// An engine is created empty (or through a constructor that decomposes
/// right away), factored by [`decompose`](Self::decompose), and then used
/// for any number of solves. Every query before a successful `decompose`
/// returns [`LinalgError::NotDecomposed`].
///
/// Right-hand sides have `equations_count()` rows. The in-place solves
/// leave the solution in the leading `unknowns_count()` entries, so a
/// least-squares engine can reuse the right-hand side buffer.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::{CholeskyDecomposition, LinearSystemSolver, LuDecomposition};
///
/// fn solve_with(engine: &mut dyn LinearSystemSolver<f64>, a: &Matrix<f64>) -> Vec<f64> {
///     engine.decompose(a).unwrap();
///     engine.solve(&[1.0, 2.0]).unwrap()
/// }
///
/// let a = Matrix::from_rows(2, 2, &[4.0_f64, 1.0, 1.0, 3.0]);
/// let x = solve_with(&mut LuDecomposition::default(), &a);
/// let y = solve_with(&mut CholeskyDecomposition::default(), &a);
/// assert!((x[0] - y[0]).abs() < 1e-14 && (x[1] - y[1]).abs() < 1e-14);
/// ```
pub trait LinearSystemSolver<T: FloatScalar> {
    /// Factors `a`, replacing any previous decomposition.
    fn decompose(&mut self, a: &Matrix<T>) -> Result<(), LinalgError>;

    fn is_decomposed(&self) -> bool;

    /// Rows of the decomposed matrix.
    fn equations_count(&self) -> usize;

    /// Columns of the decomposed matrix.
    fn unknowns_count(&self) -> usize;

    fn is_full_rank(&self) -> bool;

    /// Solves for one right-hand side of length `equations_count()`.
    fn solve_in_place(&self, b: &mut DataBlockMut<'_, T>) -> Result<(), LinalgError>;

    /// Solves every column of `b`.
    fn solve_matrix_in_place(&self, b: &mut MatrixViewMut<'_, T>) -> Result<(), LinalgError> {
        check_rhs(self, b.nrows())?;
        for j in 0..b.ncols() {
            self.solve_in_place(&mut b.column_mut(j))?;
        }
        Ok(())
    }

    /// Solution of `A x = b`, of length `unknowns_count()`.
    fn solve(&self, b: &[T]) -> Result<Vec<T>, LinalgError> {
        check_rhs(self, b.len())?;
        let mut x = b.to_vec();
        self.solve_in_place(&mut DataBlockMut::from_slice(&mut x))?;
        x.truncate(self.unknowns_count());
        Ok(x)
    }

    /// Solution of `A X = B`, `unknowns_count()` by `b.ncols()`.
    fn solve_matrix(&self, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        check_rhs(self, b.nrows())?;
        let mut x = b.clone();
        self.solve_matrix_in_place(&mut x.view_mut())?;
        if x.nrows() == self.unknowns_count() {
            return Ok(x);
        }
        Ok(x.sub_matrix(0, self.unknowns_count(), 0, x.ncols()).to_matrix())
    }

    /// `A^-1`, by solving against the identity.
    fn inverse(&self) -> Result<Matrix<T>, LinalgError> {
        if !self.is_decomposed() {
            return Err(LinalgError::NotDecomposed);
        }
        if self.equations_count() != self.unknowns_count() {
            return Err(LinalgError::SquareOnly);
        }
        if !self.is_full_rank() {
            return Err(LinalgError::RankError);
        }
        self.solve_matrix(&Matrix::identity(self.equations_count()))
    }
}

/// Validates a right-hand side of `len` rows against a solver.
pub(crate) fn check_rhs<T: FloatScalar, S: LinearSystemSolver<T> + ?Sized>(
    solver: &S,
    len: usize,
) -> Result<(), LinalgError> {
    if !solver.is_decomposed() {
        return Err(LinalgError::NotDecomposed);
    }
    if len != solver.equations_count() {
        return Err(LinalgError::IncompatibleDimensions);
    }
    Ok(())
}
