mod block;
mod linalg;
mod ops;
mod util;

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::datablock::{DataBlock, DataBlockMut};
use crate::traits::{MatrixMut, MatrixRef, Scalar};
use crate::view::{MatrixView, MatrixViewMut};

/// Heap-allocated dense matrix.
///
/// Column-major `Vec<T>` storage: element `(i, j)` is `data[j * nrows + i]`.
/// Rows, columns and the diagonal are handed out as strided
/// [`DataBlock`]s; rectangular blocks as [`MatrixView`]s. None of these copy.
///
/// # Examples
///
/// ```
/// use densela::Matrix;
///
/// let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.row(1).to_vec(), vec![3.0, 4.0]);
///
/// let b = Matrix::<f64>::identity(3);
/// assert_eq!(b.diag().sum(), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// `nrows x ncols` matrix of zeros.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::<f64>::zeros(2, 3);
    /// assert_eq!((m.nrows(), m.ncols()), (2, 3));
    /// assert_eq!(m[(1, 2)], 0.0);
    /// ```
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Matrix with every element set to `value`.
    pub fn fill(nrows: usize, ncols: usize, value: T) -> Self {
        Self {
            data: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::diagonal(&vec![T::one(); n])
    }

    /// Square matrix with `values` on the diagonal.
    ///
    /// ```
    /// use densela::Matrix;
    /// let d = Matrix::diagonal(&[1.0_f64, 2.0, 3.0]);
    /// assert_eq!(d[(1, 1)], 2.0);
    /// assert_eq!(d[(0, 1)], 0.0);
    /// ```
    pub fn diagonal(values: &[T]) -> Self {
        let n = values.len();
        let mut m = Self::zeros(n, n);
        for (i, &v) in values.iter().enumerate() {
            m.data[i * n + i] = v;
        }
        m
    }

    /// Matrix from a column-major slice.
    ///
    /// Panics if `slice.len() != nrows * ncols`.
    ///
    /// ```
    /// use densela::Matrix;
    /// // col0=[1,3], col1=[2,4]
    /// let m = Matrix::from_slice(2, 2, &[1.0_f64, 3.0, 2.0, 4.0]);
    /// assert_eq!(m[(1, 0)], 3.0);
    /// assert_eq!(m[(0, 1)], 2.0);
    /// ```
    pub fn from_slice(nrows: usize, ncols: usize, slice: &[T]) -> Self {
        assert_eq!(
            slice.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            slice.len(),
            nrows,
            ncols,
        );
        Self {
            data: slice.to_vec(),
            nrows,
            ncols,
        }
    }

    /// Matrix from a row-major slice, transposed into column-major storage.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// assert_eq!(m[(0, 2)], 3.0);
    /// assert_eq!(m[(1, 0)], 4.0);
    /// ```
    pub fn from_rows(nrows: usize, ncols: usize, row_major: &[T]) -> Self {
        assert_eq!(
            row_major.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            row_major.len(),
            nrows,
            ncols,
        );
        let mut data = vec![T::zero(); nrows * ncols];
        for i in 0..nrows {
            for j in 0..ncols {
                data[j * nrows + i] = row_major[i * ncols + j];
            }
        }
        Self { data, nrows, ncols }
    }

    /// Matrix from an owned column-major `Vec<T>`.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            nrows * ncols,
            "vec length {} does not match {}x{} matrix",
            data.len(),
            nrows,
            ncols,
        );
        Self { data, nrows, ncols }
    }

    /// Copies any view (transposed or strided) into a new matrix.
    pub fn from_view(view: &MatrixView<'_, T>) -> Self {
        view.to_matrix()
    }

    /// Single-column matrix holding the elements of a vector.
    pub fn column_vector(values: &[T]) -> Self {
        Self::from_slice(values.len(), 1, values)
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self[(row, col)] = value;
    }
}

impl<T> Matrix<T> {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Calls `f(row, col)` for each element.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    /// assert_eq!(m[(1, 1)], 4.0);
    /// assert_eq!(m[(2, 0)], 6.0);
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Column-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    // ── Views ───────────────────────────────────────────────────────

    /// View of the whole matrix.
    #[inline]
    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView::from_column_major(&self.data, self.nrows, self.ncols)
    }

    /// Exclusive view of the whole matrix. Writes land in `self`.
    #[inline]
    pub fn view_mut(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut::from_column_major(&mut self.data, self.nrows, self.ncols)
    }

    /// `nr x nc` block with top-left corner `(r0, c0)`.
    pub fn sub_matrix(&self, r0: usize, nr: usize, c0: usize, nc: usize) -> MatrixView<'_, T> {
        self.view().extract(r0, nr, c0, nc)
    }

    pub fn sub_matrix_mut(&mut self, r0: usize, nr: usize, c0: usize, nc: usize) -> MatrixViewMut<'_, T> {
        self.view_mut().into_extract(r0, nr, c0, nc)
    }

    pub fn row(&self, i: usize) -> DataBlock<'_, T> {
        self.view().row(i)
    }

    pub fn column(&self, j: usize) -> DataBlock<'_, T> {
        self.view().column(j)
    }

    pub fn diag(&self) -> DataBlock<'_, T> {
        self.view().diagonal()
    }

    pub fn row_mut(&mut self, i: usize) -> DataBlockMut<'_, T> {
        assert!(i < self.nrows, "row {} out of bounds for {} rows", i, self.nrows);
        let inc = self.nrows as isize;
        DataBlockMut::with_len(&mut self.data, i, self.ncols, inc)
    }

    pub fn column_mut(&mut self, j: usize) -> DataBlockMut<'_, T> {
        assert!(j < self.ncols, "column {} out of bounds for {} columns", j, self.ncols);
        let n = self.nrows;
        DataBlockMut::with_len(&mut self.data, j * n, n, 1)
    }

    pub fn diag_mut(&mut self) -> DataBlockMut<'_, T> {
        let n = self.nrows.min(self.ncols);
        let inc = self.nrows as isize + 1;
        DataBlockMut::with_len(&mut self.data, 0, n, inc)
    }
}

// ── MatrixRef / MatrixMut ───────────────────────────────────────────

impl<T> MatrixRef<T> for Matrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        &self[(row, col)]
    }
}

impl<T> MatrixMut<T> for Matrix<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self[(row, col)]
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.nrows && col < self.ncols, "index ({}, {}) out of bounds", row, col);
        &self.data[col * self.nrows + row]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.nrows && col < self.ncols, "index ({}, {}) out of bounds", row, col);
        &mut self.data[col * self.nrows + row]
    }
}

impl<'a, T: Scalar> From<MatrixView<'a, T>> for Matrix<T> {
    fn from(view: MatrixView<'a, T>) -> Self {
        view.to_matrix()
    }
}
