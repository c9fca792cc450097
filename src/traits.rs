use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be stored in matrices and vectors.
///
/// Blanket-implemented for all types satisfying the bounds.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Bounds the FFT backend puts on element types.
///
/// With `std` this is [`rustfft::FftNum`]; without it there are none.
#[cfg(feature = "std")]
pub trait FftBound: rustfft::FftNum {}

#[cfg(feature = "std")]
impl<T: rustfft::FftNum> FftBound for T {}

#[cfg(not(feature = "std"))]
pub trait FftBound {}

#[cfg(not(feature = "std"))]
impl<T> FftBound for T {}

/// Trait for real floating-point elements (`f32`, `f64`).
///
/// Required by everything that needs `sqrt`, `abs` or an epsilon:
/// transformations, decompositions, norms and solvers.
pub trait FloatScalar: Scalar + Float + FftBound {
    /// Converts an `f64` literal into `Self`.
    ///
    /// Used for the hard-coded thresholds of the solvers.
    #[inline]
    fn lit(x: f64) -> Self {
        <Self as num_traits::NumCast>::from(x).unwrap_or_else(Self::nan)
    }

    /// Converts a count into `Self`.
    #[inline]
    fn from_usize(n: usize) -> Self {
        <Self as num_traits::NumCast>::from(n).unwrap_or_else(Self::nan)
    }
}

impl<T: Scalar + Float + FftBound> FloatScalar for T {}

/// Read-only element access to a matrix-like type.
///
/// Implemented by the owning [`Matrix`](crate::Matrix) and by both
/// strided views, so the symmetric products in
/// [`linalg::symmetric`](crate::linalg::symmetric) accept any of them.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;
}

/// Mutable element access to a matrix-like type.
///
/// Writes go straight to the backing storage, so every view sharing
/// that storage observes them.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}
