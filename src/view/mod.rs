//! Non-owning strided matrix views.
//!
//! Element `(r, c)` of a view lives at `data[start + r * row_inc + c * col_inc]`.
//! Transposition swaps the two increments and sub-blocks only move `start`,
//! so neither copies. Increments may be negative.
//!
//! A [`MatrixViewMut`] writes straight into the storage it borrows (usually a
//! [`Matrix`](crate::Matrix)); those writes are what the in-place
//! decompositions rely on.

mod ops;

use core::ops::{Index, IndexMut};

use crate::datablock::{DataBlock, DataBlockMut};
use crate::traits::{MatrixMut, MatrixRef};

/// Panics unless every element of the described view lies inside the buffer.
///
/// The position is affine in `(r, c)`, so checking the four corners is enough.
fn check_view(buf_len: usize, start: usize, nrows: usize, ncols: usize, row_inc: isize, col_inc: isize) {
    if nrows == 0 || ncols == 0 {
        return;
    }
    let s = start as isize;
    let lr = (nrows as isize - 1) * row_inc;
    let lc = (ncols as isize - 1) * col_inc;
    let corners = [s, s + lr, s + lc, s + lr + lc];
    let lo = corners.iter().copied().min().unwrap_or(s);
    let hi = corners.iter().copied().max().unwrap_or(s);
    assert!(
        lo >= 0 && (hi as usize) < buf_len,
        "{}x{} view at {} with increments ({}, {}) out of bounds for buffer of {}",
        nrows, ncols, start, row_inc, col_inc, buf_len,
    );
}

// ── MatrixView ──────────────────────────────────────────────────────

/// Read-only strided view over a matrix buffer.
///
/// ```
/// use densela::{Matrix, MatrixView};
///
/// let m = Matrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// let t = m.view().transpose();
/// assert_eq!(t.nrows(), 3);
/// assert_eq!(t[(2, 1)], 6.0);
///
/// // same storage, walked explicitly: rows of the 2x3 column-major buffer
/// let v = MatrixView::new(m.as_slice(), 0, 2, 3, 1, 2);
/// assert_eq!(v[(1, 2)], 6.0);
/// ```
#[derive(Debug)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    start: usize,
    nrows: usize,
    ncols: usize,
    row_inc: isize,
    col_inc: isize,
}

impl<T> Clone for MatrixView<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<'_, T> {}

impl<'a, T> MatrixView<'a, T> {
    pub fn new(
        data: &'a [T],
        start: usize,
        nrows: usize,
        ncols: usize,
        row_inc: isize,
        col_inc: isize,
    ) -> Self {
        check_view(data.len(), start, nrows, ncols, row_inc, col_inc);
        Self {
            data,
            start,
            nrows,
            ncols,
            row_inc,
            col_inc,
        }
    }

    /// Column-major view over a contiguous slice.
    pub fn from_column_major(data: &'a [T], nrows: usize, ncols: usize) -> Self {
        Self::new(data, 0, nrows, ncols, 1, nrows as isize)
    }

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
        self.nrows == 0 || self.ncols == 0
    }

    #[inline]
    pub fn row_increment(&self) -> isize {
        self.row_inc
    }

    #[inline]
    pub fn column_increment(&self) -> isize {
        self.col_inc
    }

    #[inline]
    fn pos(&self, r: usize, c: usize) -> usize {
        (self.start as isize + r as isize * self.row_inc + c as isize * self.col_inc) as usize
    }

    /// Row `i` as a strided vector.
    pub fn row(&self, i: usize) -> DataBlock<'a, T> {
        assert!(i < self.nrows, "row {} out of bounds for {} rows", i, self.nrows);
        let start = if self.ncols == 0 { self.start } else { self.pos(i, 0) };
        DataBlock::with_len(self.data, start, self.ncols, line_inc(self.col_inc))
    }

    /// Column `j` as a strided vector.
    pub fn column(&self, j: usize) -> DataBlock<'a, T> {
        assert!(j < self.ncols, "column {} out of bounds for {} columns", j, self.ncols);
        let start = if self.nrows == 0 { self.start } else { self.pos(0, j) };
        DataBlock::with_len(self.data, start, self.nrows, line_inc(self.row_inc))
    }

    /// Main diagonal as a strided vector.
    pub fn diagonal(&self) -> DataBlock<'a, T> {
        let n = self.nrows.min(self.ncols);
        DataBlock::with_len(self.data, self.start, n, line_inc(self.row_inc + self.col_inc))
    }

    /// Zero-copy transpose: the increments are swapped.
    pub fn transpose(self) -> MatrixView<'a, T> {
        MatrixView {
            data: self.data,
            start: self.start,
            nrows: self.ncols,
            ncols: self.nrows,
            row_inc: self.col_inc,
            col_inc: self.row_inc,
        }
    }

    /// `nr x nc` sub-block whose top-left corner is `(r0, c0)`.
    pub fn extract(&self, r0: usize, nr: usize, c0: usize, nc: usize) -> MatrixView<'a, T> {
        assert!(
            r0 + nr <= self.nrows && c0 + nc <= self.ncols,
            "block ({},{}) size {}x{} out of bounds for {}x{} view",
            r0, c0, nr, nc, self.nrows, self.ncols,
        );
        let start = if nr == 0 || nc == 0 { self.start } else { self.pos(r0, c0) };
        MatrixView {
            data: self.data,
            start,
            nrows: nr,
            ncols: nc,
            row_inc: self.row_inc,
            col_inc: self.col_inc,
        }
    }

    /// Iterates over the rows.
    pub fn rows(&self) -> impl Iterator<Item = DataBlock<'a, T>> + 'a {
        let v = *self;
        (0..v.nrows).map(move |i| v.row(i))
    }

    /// Iterates over the columns.
    pub fn columns(&self) -> impl Iterator<Item = DataBlock<'a, T>> + 'a {
        let v = *self;
        (0..v.ncols).map(move |j| v.column(j))
    }
}

/// Lines of a degenerate view may carry a zero increment; any non-zero value
/// walks a single element identically.
#[inline]
fn line_inc(inc: isize) -> isize {
    if inc == 0 {
        1
    } else {
        inc
    }
}

impl<T> Index<(usize, usize)> for MatrixView<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &T {
        assert!(r < self.nrows && c < self.ncols, "index ({}, {}) out of bounds", r, c);
        &self.data[self.pos(r, c)]
    }
}

impl<T> MatrixRef<T> for MatrixView<'_, T> {
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

// ── MatrixViewMut ───────────────────────────────────────────────────

/// Exclusive strided view. Writes land in the borrowed storage.
///
/// ```
/// use densela::Matrix;
///
/// let mut m = Matrix::<f64>::zeros(3, 3);
/// {
///     let mut lower_right = m.sub_matrix_mut(1, 2, 1, 2);
///     lower_right.set_all(1.0);
///     lower_right.transpose().row_mut(0).set(1, 5.0);
/// }
/// assert_eq!(m[(2, 1)], 5.0);
/// assert_eq!(m[(0, 0)], 0.0);
/// ```
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    start: usize,
    nrows: usize,
    ncols: usize,
    row_inc: isize,
    col_inc: isize,
}

impl<'a, T> MatrixViewMut<'a, T> {
    pub fn new(
        data: &'a mut [T],
        start: usize,
        nrows: usize,
        ncols: usize,
        row_inc: isize,
        col_inc: isize,
    ) -> Self {
        check_view(data.len(), start, nrows, ncols, row_inc, col_inc);
        Self {
            data,
            start,
            nrows,
            ncols,
            row_inc,
            col_inc,
        }
    }

    /// Column-major view over a contiguous slice.
    pub fn from_column_major(data: &'a mut [T], nrows: usize, ncols: usize) -> Self {
        Self::new(data, 0, nrows, ncols, 1, nrows as isize)
    }

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
        self.nrows == 0 || self.ncols == 0
    }

    #[inline]
    fn pos(&self, r: usize, c: usize) -> usize {
        (self.start as isize + r as isize * self.row_inc + c as isize * self.col_inc) as usize
    }

    /// Shared view of the same elements.
    #[inline]
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView {
            data: &*self.data,
            start: self.start,
            nrows: self.nrows,
            ncols: self.ncols,
            row_inc: self.row_inc,
            col_inc: self.col_inc,
        }
    }

    /// Converts into a shared view with the full lifetime.
    pub fn into_view(self) -> MatrixView<'a, T> {
        MatrixView {
            data: self.data,
            start: self.start,
            nrows: self.nrows,
            ncols: self.ncols,
            row_inc: self.row_inc,
            col_inc: self.col_inc,
        }
    }

    /// Shorter-lived exclusive view of the same elements.
    #[inline]
    pub fn reborrow(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut {
            data: &mut *self.data,
            start: self.start,
            nrows: self.nrows,
            ncols: self.ncols,
            row_inc: self.row_inc,
            col_inc: self.col_inc,
        }
    }

    pub fn row(&self, i: usize) -> DataBlock<'_, T> {
        self.as_view().row(i)
    }

    pub fn column(&self, j: usize) -> DataBlock<'_, T> {
        self.as_view().column(j)
    }

    pub fn diagonal(&self) -> DataBlock<'_, T> {
        self.as_view().diagonal()
    }

    pub fn row_mut(&mut self, i: usize) -> DataBlockMut<'_, T> {
        assert!(i < self.nrows, "row {} out of bounds for {} rows", i, self.nrows);
        let start = if self.ncols == 0 { self.start } else { self.pos(i, 0) };
        DataBlockMut::with_len(&mut *self.data, start, self.ncols, line_inc(self.col_inc))
    }

    pub fn column_mut(&mut self, j: usize) -> DataBlockMut<'_, T> {
        assert!(j < self.ncols, "column {} out of bounds for {} columns", j, self.ncols);
        let start = if self.nrows == 0 { self.start } else { self.pos(0, j) };
        DataBlockMut::with_len(&mut *self.data, start, self.nrows, line_inc(self.row_inc))
    }

    pub fn diagonal_mut(&mut self) -> DataBlockMut<'_, T> {
        let n = self.nrows.min(self.ncols);
        DataBlockMut::with_len(&mut *self.data, self.start, n, line_inc(self.row_inc + self.col_inc))
    }

    /// Zero-copy transpose.
    pub fn transpose(self) -> MatrixViewMut<'a, T> {
        MatrixViewMut {
            data: self.data,
            start: self.start,
            nrows: self.ncols,
            ncols: self.nrows,
            row_inc: self.col_inc,
            col_inc: self.row_inc,
        }
    }

    /// Exclusive sub-block borrowed from this view.
    pub fn extract_mut(&mut self, r0: usize, nr: usize, c0: usize, nc: usize) -> MatrixViewMut<'_, T> {
        self.reborrow().into_extract(r0, nr, c0, nc)
    }

    /// Narrows this view to a sub-block, keeping the original lifetime.
    pub fn into_extract(self, r0: usize, nr: usize, c0: usize, nc: usize) -> MatrixViewMut<'a, T> {
        assert!(
            r0 + nr <= self.nrows && c0 + nc <= self.ncols,
            "block ({},{}) size {}x{} out of bounds for {}x{} view",
            r0, c0, nr, nc, self.nrows, self.ncols,
        );
        let start = if nr == 0 || nc == 0 { self.start } else { self.pos(r0, c0) };
        MatrixViewMut {
            data: self.data,
            start,
            nrows: nr,
            ncols: nc,
            row_inc: self.row_inc,
            col_inc: self.col_inc,
        }
    }
}

impl<T> Index<(usize, usize)> for MatrixViewMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &T {
        assert!(r < self.nrows && c < self.ncols, "index ({}, {}) out of bounds", r, c);
        &self.data[self.pos(r, c)]
    }
}

impl<T> IndexMut<(usize, usize)> for MatrixViewMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        assert!(r < self.nrows && c < self.ncols, "index ({}, {}) out of bounds", r, c);
        let p = self.pos(r, c);
        &mut self.data[p]
    }
}

impl<T> MatrixRef<T> for MatrixViewMut<'_, T> {
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

impl<T> MatrixMut<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self[(row, col)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    fn m3x4() -> Matrix<f64> {
        Matrix::from_fn(3, 4, |i, j| (10 * i + j) as f64)
    }

    #[test]
    fn rows_columns_share_storage() {
        let m = m3x4();
        let v = m.view();
        assert_eq!(v.row(1).to_vec(), vec![10.0, 11.0, 12.0, 13.0]);
        assert_eq!(v.column(2).to_vec(), vec![2.0, 12.0, 22.0]);
        assert_eq!(v.diagonal().to_vec(), vec![0.0, 11.0, 22.0]);
    }

    #[test]
    fn transpose_is_a_stride_swap() {
        let m = m3x4();
        let t = m.view().transpose();
        assert_eq!((t.nrows(), t.ncols()), (4, 3));
        for i in 0..3 {
            for j in 0..4 {
                assert_eq!(t[(j, i)], m[(i, j)]);
            }
        }
        assert_eq!(t.row(2).to_vec(), m.view().column(2).to_vec());
    }

    #[test]
    fn extract_nested() {
        let m = m3x4();
        let b = m.view().extract(1, 2, 1, 3);
        assert_eq!(b[(0, 0)], 11.0);
        let bb = b.transpose().extract(1, 2, 0, 2);
        // bb = rows 2..4 of the transposed 2x3 block
        assert_eq!(bb[(0, 0)], 12.0);
        assert_eq!(bb[(1, 1)], 23.0);
    }

    #[test]
    fn reversed_view() {
        let m = m3x4();
        // rows in reverse order
        let r = MatrixView::new(m.as_slice(), 2, 3, 4, -1, 3);
        assert_eq!(r.row(0).to_vec(), m.view().row(2).to_vec());
        assert_eq!(r.column(1).to_vec(), vec![21.0, 11.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn view_outside_buffer_rejected() {
        let buf = [0.0_f64; 6];
        let _ = MatrixView::new(&buf, 1, 2, 3, 1, 2);
    }

    #[test]
    fn mutation_visible_through_matrix() {
        let mut m = m3x4();
        {
            let mut v = m.view_mut();
            v.row_mut(0).set_all(-1.0);
            v.column_mut(3).set_all(7.0);
            v.diagonal_mut().set(1, 100.0);
        }
        assert_eq!(m[(0, 0)], -1.0);
        assert_eq!(m[(0, 3)], 7.0);
        assert_eq!(m[(2, 3)], 7.0);
        assert_eq!(m[(1, 1)], 100.0);
    }

    #[test]
    fn iterators() {
        let m = m3x4();
        let sums: Vec<f64> = m.view().rows().map(|r| r.sum()).collect();
        assert_eq!(sums, vec![6.0, 46.0, 86.0]);
        assert_eq!(m.view().columns().count(), 4);
    }
}
