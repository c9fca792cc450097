use crate::traits::{FloatScalar, Scalar};

use super::{DataBlock, DataBlockMut};

// ── Reductions ──────────────────────────────────────────────────────

impl<T: Scalar> DataBlock<'_, T> {
    /// Dot product. Both views must have the same length.
    ///
    /// ```
    /// use densela::DataBlock;
    /// let a = [1.0, 2.0, 3.0];
    /// let b = [4.0, 0.0, 5.0, 0.0, 6.0];
    /// let x = DataBlock::from_slice(&a);
    /// let y = DataBlock::with_len(&b, 0, 3, 2);
    /// assert_eq!(x.dot(&y), 32.0);
    /// ```
    pub fn dot(&self, other: &DataBlock<'_, T>) -> T {
        assert_eq!(self.len, other.len, "vector length mismatch");
        let mut sum = T::zero();
        for i in 0..self.len {
            sum = sum + self.data[self.pos(i)] * other.data[other.pos(i)];
        }
        sum
    }

    /// Sum of the elements.
    pub fn sum(&self) -> T {
        let mut s = T::zero();
        for i in 0..self.len {
            s = s + self.data[self.pos(i)];
        }
        s
    }
}

impl<T: FloatScalar> DataBlock<'_, T> {
    /// `true` when every element is within `[-eps, eps]`.
    pub fn is_zero(&self, eps: T) -> bool {
        self.iter().all(|x| x.abs() <= eps)
    }

    /// Euclidean distance to another view of the same length.
    pub fn distance(&self, other: &DataBlock<'_, T>) -> T {
        assert_eq!(self.len, other.len, "vector length mismatch");
        let mut scale = T::zero();
        let mut ssq = T::one();
        for i in 0..self.len {
            let d = self.data[self.pos(i)] - other.data[other.pos(i)];
            super::norm::accumulate_scaled(d, &mut scale, &mut ssq);
        }
        scale * ssq.sqrt()
    }
}

// ── In-place arithmetic ─────────────────────────────────────────────

impl<T: Scalar> DataBlockMut<'_, T> {
    /// Sets every element to `value`.
    pub fn set_all(&mut self, value: T) {
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = value;
        }
    }

    /// Copies `src` element by element.
    pub fn copy_from(&mut self, src: &DataBlock<'_, T>) {
        assert_eq!(self.len, src.len, "vector length mismatch");
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = src.data[src.pos(i)];
        }
    }

    /// Copies a contiguous slice.
    pub fn copy_from_slice(&mut self, src: &[T]) {
        self.copy_from(&DataBlock::from_slice(src));
    }

    /// `self *= factor`.
    pub fn scale(&mut self, factor: T) {
        if factor == T::one() {
            return;
        }
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = self.data[p] * factor;
        }
    }

    /// `self += other`.
    pub fn add(&mut self, other: &DataBlock<'_, T>) {
        assert_eq!(self.len, other.len, "vector length mismatch");
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = self.data[p] + other.data[other.pos(i)];
        }
    }

    /// `self -= other`.
    pub fn sub(&mut self, other: &DataBlock<'_, T>) {
        assert_eq!(self.len, other.len, "vector length mismatch");
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = self.data[p] - other.data[other.pos(i)];
        }
    }

    /// `self += a * other`.
    ///
    /// ```
    /// use densela::{DataBlock, DataBlockMut};
    /// let mut y = [1.0, 1.0, 1.0];
    /// let x = [1.0, 2.0, 3.0];
    /// DataBlockMut::from_slice(&mut y).add_scaled(2.0, &DataBlock::from_slice(&x));
    /// assert_eq!(y, [3.0, 5.0, 7.0]);
    /// ```
    pub fn add_scaled(&mut self, a: T, other: &DataBlock<'_, T>) {
        assert_eq!(self.len, other.len, "vector length mismatch");
        if a == T::zero() {
            return;
        }
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = self.data[p] + a * other.data[other.pos(i)];
        }
    }

    pub fn dot(&self, other: &DataBlock<'_, T>) -> T {
        self.as_view().dot(other)
    }

    pub fn sum(&self) -> T {
        self.as_view().sum()
    }
}

impl<T: FloatScalar> DataBlockMut<'_, T> {
    /// Changes the sign of every element.
    pub fn chs(&mut self) {
        for i in 0..self.len {
            let p = self.pos(i);
            self.data[p] = -self.data[p];
        }
    }

    pub fn is_zero(&self, eps: T) -> bool {
        self.as_view().is_zero(eps)
    }
}
