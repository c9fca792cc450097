use alloc::vec::Vec;

use crate::datablock::{DataBlock, DataBlockMut};
use crate::traits::FloatScalar;
use crate::view::MatrixViewMut;

/// Applies `I - beta * v * v'` to `y`, where `v = [1, tail...]`.
///
/// The implicit leading one is how the packed QR factors store `v`.
#[inline]
pub(crate) fn reflect<T: FloatScalar>(tail: &DataBlock<'_, T>, beta: T, y: &mut DataBlockMut<'_, T>) {
    debug_assert_eq!(tail.len() + 1, y.len());
    if beta == T::zero() {
        return;
    }
    let head = y[0];
    let s = beta * (head + y.drop_mut(1, 0).dot(tail));
    if s == T::zero() {
        return;
    }
    y[0] = head - s;
    y.drop_mut(1, 0).add_scaled(-s, tail);
}

/// Parameters `(v0, beta, mu)` of the reflection mapping `x` onto `mu * e1`.
///
/// `tail_norm` is the Euclidean norm of `x[1..]`. `v = [1, x[1..] / v0]`.
/// A `v0` of zero means the tail is already zero and only the sign of `x0`
/// may change.
fn parameters<T: FloatScalar>(x0: T, tail_norm: T) -> (T, T, T) {
    if tail_norm == T::zero() {
        // single element or zero tail: H = I, or H = I - 2 e1 e1' to make x0 positive
        return if x0 < T::zero() {
            (T::one(), T::lit(2.0), -x0)
        } else {
            (T::zero(), T::zero(), x0)
        };
    }
    let sigma = tail_norm * tail_norm;
    let mu = x0.hypot(tail_norm);
    let v0 = if x0 <= T::zero() {
        x0 - mu
    } else {
        -sigma / (x0 + mu)
    };
    let v0sq = v0 * v0;
    let beta = T::lit(2.0) * v0sq / (sigma + v0sq);
    (v0, beta, mu)
}

/// Householder reflection `H = I - beta * v * v'` with `v[0] = 1`.
///
/// Built from a vector `x`, it maps `x` onto `[mu, 0, ..., 0]` with
/// `mu = ||x||` (non-negative). `H` is symmetric and orthogonal, so applying
/// it twice gives back the input.
///
/// A vector whose norm is below `T::epsilon()` yields the identity.
///
/// ```
/// use densela::linalg::HouseholderReflection;
/// use densela::{DataBlock, DynVector};
///
/// let x = [3.0_f64, 4.0, 0.0];
/// let h = HouseholderReflection::from(&DataBlock::from_slice(&x));
/// assert!((h.mu() - 5.0).abs() < 1e-12);
///
/// let mut y = DynVector::from_slice(&x);
/// h.transform(&mut y.block_mut());
/// assert!((y[0] - 5.0).abs() < 1e-12);
/// assert!(y[1].abs() < 1e-12 && y[2].abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholderReflection<T> {
    v: Vec<T>,
    beta: T,
    mu: T,
}

impl<T: FloatScalar> HouseholderReflection<T> {
    /// Reflection for `x`. The input is not modified.
    pub fn from(x: &DataBlock<'_, T>) -> Self {
        let n = x.len();
        assert!(n > 0, "Householder reflection of an empty vector");
        let mut v = x.to_vec();
        let x0 = v[0];
        let tail = x.drop(1, 0);
        if x.nrm2() < T::epsilon() {
            v[0] = T::one();
            for t in v.iter_mut().skip(1) {
                *t = T::zero();
            }
            return Self {
                v,
                beta: T::zero(),
                mu: x0,
            };
        }
        let (v0, beta, mu) = parameters(x0, tail.nrm2());
        v[0] = T::one();
        if v0 != T::zero() && v0 != T::one() {
            let inv = T::one() / v0;
            for t in v.iter_mut().skip(1) {
                *t = *t * inv;
            }
        }
        Self { v, beta, mu }
    }

    /// Builds the reflection and overwrites `x` with its packed form:
    /// `x[0] = mu`, `x[1..] = v[1..]`.
    pub fn in_place(x: &mut DataBlockMut<'_, T>) -> Self {
        let h = Self::from(&x.as_view());
        x[0] = h.mu;
        x.drop_mut(1, 0).copy_from_slice(&h.v[1..]);
        h
    }

    /// `y := H y`.
    pub fn transform(&self, y: &mut DataBlockMut<'_, T>) {
        assert_eq!(y.len(), self.v.len(), "vector length mismatch");
        reflect(&DataBlock::from_slice(&self.v[1..]), self.beta, y);
    }

    /// `A := H A`: reflects every column.
    pub fn apply_left(&self, a: &mut MatrixViewMut<'_, T>) {
        for j in 0..a.ncols() {
            self.transform(&mut a.column_mut(j));
        }
    }

    /// `A := A H`: reflects every row.
    pub fn apply_right(&self, a: &mut MatrixViewMut<'_, T>) {
        for i in 0..a.nrows() {
            self.transform(&mut a.row_mut(i));
        }
    }

    #[inline]
    pub fn beta(&self) -> T {
        self.beta
    }

    /// First element of `H x`.
    #[inline]
    pub fn mu(&self) -> T {
        self.mu
    }

    /// Householder vector, `v[0] == 1`.
    #[inline]
    pub fn vector(&self) -> &[T] {
        &self.v
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.v.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// `true` when the reflection leaves every vector unchanged.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.beta == T::zero()
    }
}
