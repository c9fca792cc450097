use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::traits::{FloatScalar, Scalar};

use super::{DataBlock, DataBlockMut};

/// Owned, contiguous vector.
///
/// Thin wrapper around `Vec<T>` that hands out [`DataBlock`] views, so it
/// can be fed to every routine that works on strided vectors.
///
/// ```
/// use densela::DynVector;
///
/// let v = DynVector::from_slice(&[3.0_f64, 4.0]);
/// assert_eq!(v.len(), 2);
/// assert!((v.block().nrm2() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynVector<T> {
    data: Vec<T>,
}

impl<T: Scalar> DynVector<T> {
    /// Zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    pub fn fill(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Copies the elements of a strided view.
    pub fn from_block(block: &DataBlock<'_, T>) -> Self {
        Self {
            data: block.to_vec(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unit-stride view of the whole vector.
    #[inline]
    pub fn block(&self) -> DataBlock<'_, T> {
        DataBlock::from_slice(&self.data)
    }

    /// Exclusive unit-stride view of the whole vector.
    #[inline]
    pub fn block_mut(&mut self) -> DataBlockMut<'_, T> {
        DataBlockMut::from_slice(&mut self.data)
    }

    pub fn dot(&self, rhs: &Self) -> T {
        self.block().dot(&rhs.block())
    }

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
}

impl<T: FloatScalar> DynVector<T> {
    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.block().nrm2()
    }
}

impl<T> Index<usize> for DynVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for DynVector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T> From<Vec<T>> for DynVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_share_storage() {
        let mut v = DynVector::from_slice(&[1.0_f64, 2.0, 3.0, 4.0]);
        v.block_mut().drop_mut(1, 1).set_all(0.0);
        assert_eq!(v.as_slice(), &[1.0, 0.0, 0.0, 4.0]);
        assert_eq!(v.block().reverse()[0], 4.0);
    }

    #[test]
    fn from_block_copies() {
        let buf = [1.0_f64, 2.0, 3.0, 4.0];
        let v = DynVector::from_block(&DataBlock::with_len(&buf, 3, 2, -3));
        assert_eq!(v.into_vec(), vec![4.0, 1.0]);
    }

    #[test]
    fn dot_and_norm() {
        let a = DynVector::from_slice(&[1.0_f64, 2.0, 2.0]);
        assert_eq!(a.dot(&a), 9.0);
        assert!((a.norm() - 3.0).abs() < 1e-15);
        assert_eq!(DynVector::<f64>::zeros(3).len(), 3);
    }
}
