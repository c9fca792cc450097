//! Transformations preserving the indefinite form `x'Jx`,
//! `J = diag(1, ..., 1, -1, ..., -1)`.
//!
//! They are the downdating counterparts of Givens rotations and Householder
//! reflections: where those remove a row from `L L'` by adding it, these
//! remove it by subtracting.

use alloc::vec::Vec;

use crate::datablock::{DataBlock, DataBlockMut};
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::view::MatrixViewMut;

// ── Hyperbolic rotation ─────────────────────────────────────────────

/// `H = [c -s; -s c]` with `c^2 - s^2 = 1`, mapping `(a, b)` onto `(r, 0)`
/// where `r^2 = a^2 - b^2`.
///
/// ```
/// use densela::linalg::HyperbolicRotation;
/// let h = HyperbolicRotation::new(5.0_f64, 3.0).unwrap();
/// let (x, y) = h.apply(5.0, 3.0);
/// assert!((x - 4.0).abs() < 1e-14 && y.abs() < 1e-14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperbolicRotation<T> {
    c: T,
    s: T,
    r: T,
}

impl<T: FloatScalar> HyperbolicRotation<T> {
    /// Rotation zeroing `b` against `a`.
    ///
    /// `|b| <= eps * |a|` gives the identity (with `b` treated as zero).
    /// `|a| == |b|` or `|b| > |a|` has no solution and returns
    /// [`LinalgError::CholeskyFailed`].
    pub fn new(a: T, b: T) -> Result<Self, LinalgError> {
        let (aa, ab) = (a.abs(), b.abs());
        if ab <= T::epsilon() * aa {
            return Ok(Self {
                c: T::one(),
                s: T::zero(),
                r: a,
            });
        }
        if ab >= aa {
            return Err(LinalgError::CholeskyFailed);
        }
        // (a - b)(a + b) avoids the cancellation of a^2 - b^2
        let r = ((aa - ab) * (aa + ab)).sqrt();
        let r = if a < T::zero() { -r } else { r };
        Ok(Self {
            c: a / r,
            s: b / r,
            r,
        })
    }

    #[inline]
    pub fn c(&self) -> T {
        self.c
    }

    #[inline]
    pub fn s(&self) -> T {
        self.s
    }

    #[inline]
    pub fn r(&self) -> T {
        self.r
    }

    /// Transformed pair `(c x - s y, c y - s x)`.
    #[inline]
    pub fn apply(&self, x: T, y: T) -> (T, T) {
        (self.c * x - self.s * y, self.c * y - self.s * x)
    }

    /// Transforms entries `i` and `j` of a vector.
    pub fn apply_to(&self, x: &mut DataBlockMut<'_, T>, i: usize, j: usize) {
        let (a, b) = self.apply(x[i], x[j]);
        x[i] = a;
        x[j] = b;
    }

    /// Transforms columns `i` and `j` of `m`, pairing `m[r, i]` with `m[r, j]`.
    pub fn apply_columns(&self, m: &mut MatrixViewMut<'_, T>, i: usize, j: usize) {
        let h = *self;
        m.transform_column_pair(i, j, move |x, y| h.apply(x, y));
    }
}

// ── Hyperbolic Householder ──────────────────────────────────────────

/// `H = I - beta * w * w' * J` with `J = diag(I_p, -I_q)`, mapping `x` onto
/// `mu * e1` where `mu^2 = x'Jx`.
///
/// `H` is `J`-orthogonal: `H' J H = J`. The first `p` coordinates carry the
/// positive sign and `x[0]` must be one of them.
///
/// `mu` takes the sign opposite to `x[0]` so that `w[0] = x[0] - mu` never
/// cancels.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperbolicHouseholder<T> {
    w: Vec<T>,
    positive: usize,
    beta: T,
    mu: T,
}

impl<T: FloatScalar> HyperbolicHouseholder<T> {
    /// Reflection for `x` whose first `positive` entries are in the positive
    /// part of `J`.
    ///
    /// Fails with [`LinalgError::CholeskyFailed`] when `x'Jx <= 0`.
    pub fn new(x: &DataBlock<'_, T>, positive: usize) -> Result<Self, LinalgError> {
        let n = x.len();
        assert!(positive >= 1 && positive <= n, "leading entry must be in the positive part");
        let pos = x.extract(0, positive, 1);
        let neg = x.drop(positive, 0);
        let (np, nn) = (pos.nrm2(), neg.nrm2());
        let mut w = x.to_vec();
        if nn <= T::epsilon() * np && pos.drop(1, 0).is_zero(T::zero()) {
            // nothing to annihilate
            return Ok(Self {
                w,
                positive,
                beta: T::zero(),
                mu: x.get(0),
            });
        }
        if nn >= np {
            return Err(LinalgError::CholeskyFailed);
        }
        let norm = ((np - nn) * (np + nn)).sqrt();
        let x0 = x.get(0);
        let mu = if x0 > T::zero() { -norm } else { norm };
        w[0] = x0 - mu;
        // w'Jw = 2 mu (mu - x0)
        let wjw = T::lit(2.0) * mu * (mu - x0);
        if wjw == T::zero() {
            return Err(LinalgError::CholeskyFailed);
        }
        Ok(Self {
            w,
            positive,
            beta: T::lit(2.0) / wjw,
            mu,
        })
    }

    /// `y := H y`.
    pub fn transform(&self, y: &mut DataBlockMut<'_, T>) {
        assert_eq!(y.len(), self.w.len(), "vector length mismatch");
        if self.beta == T::zero() {
            return;
        }
        let w = DataBlock::from_slice(&self.w);
        let p = self.positive;
        // w' J y
        let wjy = w.extract(0, p, 1).dot(&y.as_view().extract(0, p, 1))
            - w.drop(p, 0).dot(&y.as_view().drop(p, 0));
        y.add_scaled(-(self.beta * wjy), &w);
    }

    /// `A := A H'` on every row. Used to annihilate a row from the right.
    pub fn apply_rows(&self, a: &mut MatrixViewMut<'_, T>) {
        for i in 0..a.nrows() {
            self.transform(&mut a.row_mut(i));
        }
    }

    #[inline]
    pub fn mu(&self) -> T {
        self.mu
    }

    #[inline]
    pub fn beta(&self) -> T {
        self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DynVector;

    fn jform(x: &[f64], p: usize) -> f64 {
        let pos: f64 = x[..p].iter().map(|v| v * v).sum();
        let neg: f64 = x[p..].iter().map(|v| v * v).sum();
        pos - neg
    }

    #[test]
    fn rotation_preserves_indefinite_form() {
        let h = HyperbolicRotation::new(2.0_f64, -1.5).unwrap();
        let (x, y) = (0.7, -3.1);
        let (u, v) = h.apply(x, y);
        assert!(((u * u - v * v) - (x * x - y * y)).abs() < 1e-12);
        assert!((h.c() * h.c() - h.s() * h.s() - 1.0).abs() < 1e-12);
        let (r, z) = h.apply(2.0, -1.5);
        assert!((r - h.r()).abs() < 1e-14 && z.abs() < 1e-14);
    }

    #[test]
    fn rotation_degenerate_cases() {
        assert_eq!(HyperbolicRotation::new(1.0_f64, 1.0), Err(LinalgError::CholeskyFailed));
        assert_eq!(HyperbolicRotation::new(1.0_f64, -1.0), Err(LinalgError::CholeskyFailed));
        assert_eq!(HyperbolicRotation::new(1.0_f64, 2.0), Err(LinalgError::CholeskyFailed));
        let id = HyperbolicRotation::new(3.0_f64, 1e-20).unwrap();
        assert_eq!(id.apply(1.0, 2.0), (1.0, 2.0));
        let neg = HyperbolicRotation::new(-5.0_f64, 3.0).unwrap();
        assert!((neg.r() + 4.0).abs() < 1e-14);
    }

    #[test]
    fn householder_maps_onto_first_axis() {
        let x = [3.0_f64, 1.0, 2.0, 1.0, 0.5];
        let p = 3;
        let h = HyperbolicHouseholder::new(&DataBlock::from_slice(&x), p).unwrap();
        let mut y = DynVector::from_slice(&x);
        h.transform(&mut y.block_mut());
        assert!((y[0] - h.mu()).abs() < 1e-12);
        for t in &y.as_slice()[1..] {
            assert!(t.abs() < 1e-12);
        }
        assert!((h.mu() * h.mu() - jform(&x, p)).abs() < 1e-12);
    }

    #[test]
    fn householder_is_j_orthogonal() {
        let x = [2.0_f64, -1.0, 0.5, 0.3];
        let p = 2;
        let h = HyperbolicHouseholder::new(&DataBlock::from_slice(&x), p).unwrap();
        let z = [0.1_f64, 0.2, -0.7, 1.1];
        let mut y = DynVector::from_slice(&z);
        h.transform(&mut y.block_mut());
        assert!((jform(y.as_slice(), p) - jform(&z, p)).abs() < 1e-12);
    }

    #[test]
    fn householder_rejects_indefinite_vector() {
        let x = [1.0_f64, 2.0];
        assert_eq!(
            HyperbolicHouseholder::new(&DataBlock::from_slice(&x), 1),
            Err(LinalgError::CholeskyFailed)
        );
    }

    #[test]
    fn householder_no_op_when_already_reduced() {
        let x = [4.0_f64, 0.0, 0.0];
        let h = HyperbolicHouseholder::new(&DataBlock::from_slice(&x), 2).unwrap();
        assert_eq!(h.beta(), 0.0);
        assert_eq!(h.mu(), 4.0);
    }
}
