use alloc::vec;
use alloc::vec::Vec;

use crate::traits::Scalar;

use super::Matrix;

/// Panics unless `perm` is a permutation of `0..n`.
fn check_permutation(perm: &[usize], n: usize) {
    assert_eq!(perm.len(), n, "permutation length {} does not match {}", perm.len(), n);
    let mut seen = vec![false; n];
    for &p in perm {
        assert!(p < n && !seen[p], "not a permutation of 0..{}", n);
        seen[p] = true;
    }
}

/// Visits the transpositions that realise `new[i] = old[perm[i]]` in place.
fn for_each_transposition(perm: &[usize], mut swap: impl FnMut(usize, usize)) {
    let mut done = vec![false; perm.len()];
    for start in 0..perm.len() {
        if done[start] {
            continue;
        }
        done[start] = true;
        let mut j = start;
        loop {
            let k = perm[j];
            if k == start {
                break;
            }
            swap(j, k);
            done[k] = true;
            j = k;
        }
    }
}

fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &keep)| if keep { Some(i) } else { None })
        .collect()
}

// ── Selection ───────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// New matrix made of the listed rows, in the listed order.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::from_rows(3, 2, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let s = m.select_rows(&[2, 0]);
    /// assert_eq!(s, Matrix::from_rows(2, 2, &[5.0_f64, 6.0, 1.0, 2.0]));
    /// ```
    pub fn select_rows(&self, rows: &[usize]) -> Matrix<T> {
        Matrix::from_fn(rows.len(), self.ncols, |i, j| self[(rows[i], j)])
    }

    /// New matrix made of the listed columns, in the listed order.
    pub fn select_columns(&self, cols: &[usize]) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.nrows * cols.len());
        for &c in cols {
            assert!(c < self.ncols, "column {} out of bounds for {} columns", c, self.ncols);
            data.extend_from_slice(&self.data[c * self.nrows..(c + 1) * self.nrows]);
        }
        Matrix {
            data,
            nrows: self.nrows,
            ncols: cols.len(),
        }
    }

    /// Keeps the rows whose mask entry is `true`.
    pub fn select_rows_mask(&self, mask: &[bool]) -> Matrix<T> {
        assert_eq!(mask.len(), self.nrows, "mask length does not match row count");
        self.select_rows(&mask_indices(mask))
    }

    /// Keeps the columns whose mask entry is `true`.
    pub fn select_columns_mask(&self, mask: &[bool]) -> Matrix<T> {
        assert_eq!(mask.len(), self.ncols, "mask length does not match column count");
        self.select_columns(&mask_indices(mask))
    }

    // ── Permutation ─────────────────────────────────────────────────

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.view_mut().swap_rows(i, j);
    }

    pub fn swap_columns(&mut self, i: usize, j: usize) {
        self.view_mut().swap_columns(i, j);
    }

    /// Reorders the rows in place so that new row `i` is old row `perm[i]`.
    ///
    /// ```
    /// use densela::Matrix;
    /// let mut m = Matrix::from_rows(3, 1, &[10.0_f64, 20.0, 30.0]);
    /// m.permute_rows(&[1, 2, 0]);
    /// assert_eq!(m.as_slice(), &[20.0, 30.0, 10.0]);
    /// ```
    pub fn permute_rows(&mut self, perm: &[usize]) {
        check_permutation(perm, self.nrows);
        let mut v = self.view_mut();
        for_each_transposition(perm, |a, b| v.swap_rows(a, b));
    }

    /// Reorders the columns in place so that new column `j` is old column `perm[j]`.
    pub fn permute_columns(&mut self, perm: &[usize]) {
        check_permutation(perm, self.ncols);
        let mut v = self.view_mut();
        for_each_transposition(perm, |a, b| v.swap_columns(a, b));
    }
}
