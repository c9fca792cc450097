//! Elementary transformations, triangular solvers and decompositions.
//!
//! Every decomposition engine owns a packed copy of its input and implements
//! [`LinearSystemSolver`]. Low-level routines that work on caller-owned
//! storage (`triangular`, `symmetric::lcholesky`, the triangularization
//! drivers) operate through [`MatrixViewMut`](crate::MatrixViewMut) and write
//! into the viewed buffer.

pub mod gauss_jordan;
pub mod givens;
pub mod householder;
pub mod hyperbolic;
pub mod lu;
pub mod pinv;
pub mod qr;
pub mod solver;
pub mod symmetric;
pub mod toeplitz;
pub mod triangular;
pub mod triangularize;


pub use gauss_jordan::{gauss_jordan, GaussJordanSolver};
pub use givens::{hypotenuse, GivensRotation};
pub use householder::HouseholderReflection;
pub use hyperbolic::{HyperbolicHouseholder, HyperbolicRotation};
pub use lu::{LuAlgorithm, LuDecomposition};
pub use pinv::moore_penrose;
pub use qr::{HouseholderQr, LeastSquares, PivotedQr, ThinQr};
pub use solver::LinearSystemSolver;
pub use symmetric::CholeskyDecomposition;
pub use toeplitz::SymmetricToeplitz;
pub use triangularize::{givens_triangularize, householder_triangularize, mixed_triangularize};

/// Errors from linear algebra operations.
///
/// Returned by decompositions, solvers and the `Matrix` convenience methods.
///
/// ```
/// use densela::{LinalgError, Matrix};
///
/// let singular = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(singular.lu().unwrap_err(), LinalgError::Singular);
///
/// let not_pd = Matrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(not_pd.cholesky().unwrap_err(), LinalgError::CholeskyFailed);
///
/// let wide = Matrix::<f64>::zeros(2, 3);
/// assert_eq!(wide.lu().unwrap_err(), LinalgError::SquareOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// Operand shapes do not fit together.
    IncompatibleDimensions,
    /// The operation needs a square matrix.
    SquareOnly,
    /// A pivot fell below the tolerance with an inconsistent right-hand side.
    Singular,
    /// The operation needs full rank and the system is rank-deficient.
    RankError,
    /// The matrix is not positive (semi-)definite within tolerance.
    CholeskyFailed,
    /// The engine was queried before `decompose` succeeded.
    NotDecomposed,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::IncompatibleDimensions => write!(f, "incompatible matrix dimensions"),
            LinalgError::SquareOnly => write!(f, "operation requires a square matrix"),
            LinalgError::Singular => write!(f, "matrix is singular"),
            LinalgError::RankError => write!(f, "matrix is rank deficient"),
            LinalgError::CholeskyFailed => write!(f, "matrix is not positive definite"),
            LinalgError::NotDecomposed => write!(f, "decomposition has not been computed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}

/// Default tolerance of every engine: machine epsilon of `T`.
#[inline]
pub(crate) fn default_epsilon<T: crate::FloatScalar>() -> T {
    T::epsilon()
}
