use crate::datablock::{DataBlock, DynVector};
use crate::traits::{FloatScalar, Scalar};
use crate::Matrix;

use super::{MatrixView, MatrixViewMut};

// ── Products and copies ─────────────────────────────────────────────

impl<T: Scalar> MatrixView<'_, T> {
    /// Copies the viewed elements into a new column-major matrix.
    pub fn to_matrix(&self) -> Matrix<T> {
        Matrix::from_fn(self.nrows, self.ncols, |i, j| self[(i, j)])
    }

    /// Matrix product `self * rhs` (naive triple loop, column oriented).
    ///
    /// ```
    /// use densela::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// let p = a.view().transpose().times(&a.view());
    /// assert_eq!(p[(0, 0)], 10.0);
    /// assert_eq!(p[(0, 1)], 14.0);
    /// ```
    pub fn times(&self, rhs: &MatrixView<'_, T>) -> Matrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = Matrix::zeros(self.nrows, rhs.ncols);
        out.view_mut().add_product(self, rhs);
        out
    }

    /// Matrix-vector product `self * x`.
    pub fn times_vec(&self, x: &DataBlock<'_, T>) -> DynVector<T> {
        assert_eq!(
            self.ncols,
            x.len(),
            "dimension mismatch: {}x{} * vector of {}",
            self.nrows, self.ncols, x.len(),
        );
        let mut y = DynVector::zeros(self.nrows);
        for k in 0..self.ncols {
            let xk = x.get(k);
            if xk != T::zero() {
                y.block_mut().add_scaled(xk, &self.column(k));
            }
        }
        y
    }
}

impl<T: FloatScalar> MatrixView<'_, T> {
    /// Frobenius norm, scaled against overflow.
    pub fn frobenius_norm(&self) -> T {
        let mut scale = T::zero();
        let mut ssq = T::one();
        for j in 0..self.ncols {
            for x in self.column(j).iter() {
                crate::datablock::accumulate_scaled(x, &mut scale, &mut ssq);
            }
        }
        scale * ssq.sqrt()
    }

    /// `true` when every element is within `[-eps, eps]`.
    pub fn is_zero(&self, eps: T) -> bool {
        self.columns().all(|c| c.is_zero(eps))
    }

    /// Largest absolute value.
    pub fn max_abs(&self) -> T {
        self.columns().fold(T::zero(), |m, c| m.max(c.nrm_inf()))
    }
}

// ── In-place arithmetic ─────────────────────────────────────────────

impl<T: Scalar> MatrixViewMut<'_, T> {
    pub fn set_all(&mut self, value: T) {
        for j in 0..self.ncols {
            self.column_mut(j).set_all(value);
        }
    }

    /// Copies `src`, which must have the same shape.
    pub fn copy_from(&mut self, src: &MatrixView<'_, T>) {
        self.assert_same_shape(src, "copy");
        for j in 0..self.ncols {
            self.column_mut(j).copy_from(&src.column(j));
        }
    }

    /// `self += other`.
    pub fn add(&mut self, other: &MatrixView<'_, T>) {
        self.assert_same_shape(other, "+=");
        for j in 0..self.ncols {
            self.column_mut(j).add(&other.column(j));
        }
    }

    /// `self -= other`.
    pub fn sub(&mut self, other: &MatrixView<'_, T>) {
        self.assert_same_shape(other, "-=");
        for j in 0..self.ncols {
            self.column_mut(j).sub(&other.column(j));
        }
    }

    /// `self += a * other`.
    pub fn add_scaled(&mut self, a: T, other: &MatrixView<'_, T>) {
        self.assert_same_shape(other, "+= a *");
        for j in 0..self.ncols {
            self.column_mut(j).add_scaled(a, &other.column(j));
        }
    }

    /// `self *= factor`.
    pub fn scale(&mut self, factor: T) {
        for j in 0..self.ncols {
            self.column_mut(j).scale(factor);
        }
    }

    /// `self += a * b`.
    pub fn add_product(&mut self, a: &MatrixView<'_, T>, b: &MatrixView<'_, T>) {
        assert!(
            a.ncols == b.nrows && a.nrows == self.nrows && b.ncols == self.ncols,
            "dimension mismatch: {}x{} += {}x{} * {}x{}",
            self.nrows, self.ncols, a.nrows, a.ncols, b.nrows, b.ncols,
        );
        for j in 0..b.ncols {
            let mut cj = self.column_mut(j);
            for k in 0..a.ncols {
                let bkj = b[(k, j)];
                if bkj != T::zero() {
                    cj.add_scaled(bkj, &a.column(k));
                }
            }
        }
    }

    /// `self -= a * b`.
    pub fn sub_product(&mut self, a: &MatrixView<'_, T>, b: &MatrixView<'_, T>) {
        assert!(
            a.ncols == b.nrows && a.nrows == self.nrows && b.ncols == self.ncols,
            "dimension mismatch: {}x{} -= {}x{} * {}x{}",
            self.nrows, self.ncols, a.nrows, a.ncols, b.nrows, b.ncols,
        );
        for j in 0..b.ncols {
            let mut cj = self.column_mut(j);
            for k in 0..a.ncols {
                let bkj = b[(k, j)];
                if bkj != T::zero() {
                    cj.add_scaled(T::zero() - bkj, &a.column(k));
                }
            }
        }
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        assert!(i < self.nrows && j < self.nrows, "row index out of bounds");
        if i == j {
            return;
        }
        for c in 0..self.ncols {
            let (pi, pj) = (self.pos(i, c), self.pos(j, c));
            self.data.swap(pi, pj);
        }
    }

    pub fn swap_columns(&mut self, i: usize, j: usize) {
        assert!(i < self.ncols && j < self.ncols, "column index out of bounds");
        if i == j {
            return;
        }
        for r in 0..self.nrows {
            let (pi, pj) = (self.pos(r, i), self.pos(r, j));
            self.data.swap(pi, pj);
        }
    }

    /// Column `dst += a * column src`.
    ///
    /// ```
    /// use densela::Matrix;
    /// let mut m = Matrix::from_rows(2, 2, &[1.0_f64, 10.0, 2.0, 20.0]);
    /// m.view_mut().add_scaled_column(1, 0, -10.0);
    /// assert_eq!(m.column(1).to_vec(), vec![0.0, 0.0]);
    /// ```
    pub fn add_scaled_column(&mut self, dst: usize, src: usize, a: T) {
        assert!(dst != src, "column cannot be combined with itself");
        self.transform_column_pair(dst, src, |d, s| (d + a * s, s));
    }

    /// Row `dst += a * row src`.
    pub fn add_scaled_row(&mut self, dst: usize, src: usize, a: T) {
        assert!(dst != src, "row cannot be combined with itself");
        self.transform_row_pair(dst, src, |d, s| (d + a * s, s));
    }

    /// Replaces each pair `(self[i, c], self[j, c])` by `f` of that pair.
    ///
    /// Rotations between two rows of the same view go through here.
    pub fn transform_row_pair(&mut self, i: usize, j: usize, f: impl Fn(T, T) -> (T, T)) {
        assert!(i < self.nrows && j < self.nrows && i != j, "invalid row pair ({}, {})", i, j);
        for c in 0..self.ncols {
            let (pi, pj) = (self.pos(i, c), self.pos(j, c));
            let (x, y) = f(self.data[pi], self.data[pj]);
            self.data[pi] = x;
            self.data[pj] = y;
        }
    }

    /// Column counterpart of [`transform_row_pair`](Self::transform_row_pair).
    pub fn transform_column_pair(&mut self, i: usize, j: usize, f: impl Fn(T, T) -> (T, T)) {
        assert!(i < self.ncols && j < self.ncols && i != j, "invalid column pair ({}, {})", i, j);
        for r in 0..self.nrows {
            let (pi, pj) = (self.pos(r, i), self.pos(r, j));
            let (x, y) = f(self.data[pi], self.data[pj]);
            self.data[pi] = x;
            self.data[pj] = y;
        }
    }

    pub fn to_matrix(&self) -> Matrix<T> {
        self.as_view().to_matrix()
    }

    fn assert_same_shape(&self, other: &MatrixView<'_, T>, op: &str) {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch: {}x{} {} {}x{}",
            self.nrows, self.ncols, op, other.nrows, other.ncols,
        );
    }
}

impl<T: FloatScalar> MatrixViewMut<'_, T> {
    /// Changes the sign of every element.
    pub fn chs(&mut self) {
        for j in 0..self.ncols {
            self.column_mut(j).chs();
        }
    }

    pub fn frobenius_norm(&self) -> T {
        self.as_view().frobenius_norm()
    }

    pub fn is_zero(&self, eps: T) -> bool {
        self.as_view().is_zero(eps)
    }
}
