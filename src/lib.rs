//! # densela
//!
//! Dense real linear algebra on strided storage: zero-copy vector and matrix
//! views, elementary orthogonal and hyperbolic transformations, triangular
//! solvers, and the LU / QR / Cholesky family with a common solver contract.
//! `no_std` with `alloc`.
//!
//! ## Quick start
//!
//! ```
//! use densela::Matrix;
//! use densela::linalg::LinearSystemSolver;
//!
//! // Solve a linear system Ax = b
//! let a = Matrix::from_rows(3, 3, &[
//!     2.0_f64, 1.0, -1.0,
//!     -3.0, -1.0, 2.0,
//!     -2.0, 1.0, 2.0,
//! ]);
//! let x = a.solve(&[8.0, -11.0, -3.0]).unwrap(); // x = [2, 3, -1]
//! assert!((x[0] - 2.0).abs() < 1e-12);
//!
//! // Least squares on a tall system
//! let design = Matrix::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
//! let fit = design.qr().unwrap().least_squares(&[1.0, 3.0, 5.0, 7.0, 9.0]).unwrap();
//! assert!((fit.coefficients[1] - 2.0).abs() < 1e-12);
//!
//! // Any engine through the common contract
//! let chol = a.transpose().times(&a).cholesky().unwrap();
//! assert!(chol.is_full_rank());
//! ```
//!
//! ## Modules
//!
//! - [`datablock`] — [`DataBlock`] / [`DataBlockMut`]: strided views over a
//!   slice (`start`, `len`, signed increment). Rows, columns and diagonals of
//!   every matrix are handed out as data blocks. BLAS-1 style kernels: dot,
//!   scaled 2-norm, `axpy`, max-abs search. [`DynVector`] owns its storage.
//!
//! - [`matrix`] — Heap-allocated column-major [`Matrix`]: constructors,
//!   arithmetic operators, row/column selection and permutation, norms and
//!   cleaning helpers, plus `lu()`, `qr()`, `cholesky()`, `solve()`,
//!   `inverse()`, `det()` and `pinv()` conveniences.
//!
//! - [`view`] — [`MatrixView`] / [`MatrixViewMut`]: rectangular windows with
//!   independent row and column increments. Transposing a view swaps the
//!   increments and never copies.
//!
//! - [`linalg`] — Householder reflections, Givens and hyperbolic rotations,
//!   triangularization drivers, lower/upper triangular solvers, LU (Gauss or
//!   Crout-Doolittle), Householder QR with column removal, pivoted QR, thin
//!   QR, Cholesky with rank-one updates, Moore-Penrose pseudo-inverse,
//!   Gauss-Jordan, and symmetric Toeplitz solvers (Durbin, Levinson, Trench).
//!
//! - [`traits`] — Element trait hierarchy:
//!   - [`Scalar`] — all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`] — real floats (`Scalar + Float`), used by everything numeric
//!   - [`MatrixRef`] / [`MatrixMut`] — generic read/write access for algorithms
//!
//! ## Tolerances
//!
//! Every decomposition engine carries its own `epsilon` (default
//! `T::epsilon()`), set with `with_epsilon` / `set_epsilon`. The low-level
//! triangular solvers and the semi-definite Cholesky take their tolerance as
//! an argument.
//!
//! ## Logging
//!
//! Rank decisions (dropped or cycled columns, zero pivots, failed
//! eliminations) are reported through the [`log`](https://docs.rs/log)
//! facade at `debug` level, LU pivot swaps at `trace` level. No logger is
//! installed by the library.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Hardware FPU via system libm, `std::error::Error` for [`LinalgError`], `rustfft` transforms for the Toeplitz multiply |
//! | `libm`    | baseline | Pure-Rust software float fallback for `no_std` |

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod datablock;
mod fft;
pub mod linalg;
pub mod matrix;
pub mod traits;
pub mod view;

pub use datablock::{DataBlock, DataBlockMut, DynVector};
pub use linalg::LinalgError;
pub use matrix::Matrix;
pub use traits::{FftBound, FloatScalar, MatrixMut, MatrixRef, Scalar};
pub use view::{MatrixView, MatrixViewMut};
