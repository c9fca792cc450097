//! Symmetric positive-definite Toeplitz systems in `O(n^2)`.
//!
//! A symmetric Toeplitz matrix is given by its first column
//! `r = [r_0, ..., r_{n-1}]`, with `T[i, j] = r[|i - j|]`. The recursions
//! work on `r / r_0` internally and fail with
//! [`LinalgError::CholeskyFailed`] when a leading block turns out not to
//! be positive definite.

use alloc::vec::Vec;

use log::debug;
use num_complex::Complex;

use crate::fft::{padded_len, to_complex, FftPlan};
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::Matrix;

fn normalized<T: FloatScalar>(r: &[T]) -> Result<(T, Vec<T>), LinalgError> {
    let r0 = r[0];
    if !(r0 > T::zero()) {
        debug!("toeplitz: non-positive leading coefficient");
        return Err(LinalgError::CholeskyFailed);
    }
    Ok((r0, r.iter().map(|&x| x / r0).collect()))
}

/// Next prediction error `beta * (1 - alpha^2)`, which must stay positive.
fn shrink<T: FloatScalar>(beta: T, alpha: T, k: usize) -> Result<T, LinalgError> {
    let beta = (T::one() - alpha * alpha) * beta;
    if beta > T::zero() {
        Ok(beta)
    } else {
        debug!("toeplitz: leading block of order {} is not positive definite", k + 1);
        Err(LinalgError::CholeskyFailed)
    }
}

/// `sum_i r[k - i] * x[i]` for `i < k`.
fn lagged_dot<T: FloatScalar>(r: &[T], x: &[T], k: usize) -> T {
    (0..k).fold(T::zero(), |acc, i| acc + r[k - i] * x[i])
}

/// `x[i] + a * x[k - 1 - i]` for `i < k`, then `a`: one step of Durbin's
/// recursion.
fn extend<T: FloatScalar>(x: &mut Vec<T>, a: T) {
    let k = x.len();
    let next: Vec<T> = (0..k).map(|i| x[i] + a * x[k - 1 - i]).collect();
    x.copy_from_slice(&next);
    x.push(a);
}

/// Durbin's recursion for the Yule-Walker equations.
///
/// With `r` of length `n + 1`, solves `T(r_0..r_{n-1}) y = -(r_1..r_n)`
/// and returns `y`, of length `n`.
///
/// ```
/// use densela::linalg::toeplitz::durbin;
///
/// // AR(1) autocovariances: y = [-0.5, 0]
/// let y = durbin(&[1.0_f64, 0.5, 0.25]).unwrap();
/// assert!((y[0] + 0.5).abs() < 1e-15 && y[1].abs() < 1e-15);
/// ```
pub fn durbin<T: FloatScalar>(r: &[T]) -> Result<Vec<T>, LinalgError> {
    if r.len() < 2 {
        return Ok(Vec::new());
    }
    let (_, r) = normalized(r)?;
    let n = r.len() - 1;
    let mut y = Vec::with_capacity(n);
    y.push(-r[1]);
    let mut alpha = -r[1];
    let mut beta = T::one();
    for k in 1..n {
        beta = shrink(beta, alpha, k)?;
        alpha = -(r[k + 1] + lagged_dot(&r, &y, k)) / beta;
        extend(&mut y, alpha);
    }
    Ok(y)
}

/// Levinson's recursion: solves `T(r) x = b` for a general right-hand side.
pub fn solve_levinson_system<T: FloatScalar>(r: &[T], b: &[T]) -> Result<Vec<T>, LinalgError> {
    let n = r.len();
    if b.len() != n {
        return Err(LinalgError::IncompatibleDimensions);
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    let (r0, r) = normalized(r)?;
    let mut x = Vec::with_capacity(n);
    x.push(b[0] / r0);
    if n == 1 {
        return Ok(x);
    }
    let mut y = Vec::with_capacity(n);
    y.push(-r[1]);
    let mut alpha = -r[1];
    let mut beta = T::one();
    for k in 1..n {
        beta = shrink(beta, alpha, k)?;
        let mu = (b[k] / r0 - lagged_dot(&r, &x, k)) / beta;
        // x += mu * reverse(y), then append mu
        for i in 0..k {
            x[i] = x[i] + mu * y[k - 1 - i];
        }
        x.push(mu);
        if k + 1 < n {
            alpha = -(r[k + 1] + lagged_dot(&r, &y, k)) / beta;
            extend(&mut y, alpha);
        }
    }
    Ok(x)
}

/// Trench's algorithm: the full inverse of `T(r)` from Durbin's solution,
/// using that the inverse is symmetric and persymmetric.
pub fn trench_inverse<T: FloatScalar>(r: &[T]) -> Result<Matrix<T>, LinalgError> {
    let n = r.len();
    if n == 0 {
        return Ok(Matrix::zeros(0, 0));
    }
    let (r0, rn) = normalized(r)?;
    let y = durbin(&rn)?;
    let d = T::one() + (0..n - 1).fold(T::zero(), |acc, i| acc + rn[i + 1] * y[i]);
    if !(d > T::zero()) {
        return Err(LinalgError::CholeskyFailed);
    }
    let gamma = T::one() / d;
    // v(k) = gamma * y(n - k), 1-based
    let v = |k: usize| gamma * y[n - 1 - k];

    let mut b = Matrix::zeros(n, n);
    // writes B(i, j) (1-based) at its symmetric and persymmetric images
    let put = |b: &mut Matrix<T>, i: usize, j: usize, x: T| {
        for (p, q) in [(i, j), (j, i), (n + 1 - j, n + 1 - i), (n + 1 - i, n + 1 - j)] {
            b[(p - 1, q - 1)] = x;
        }
    };
    put(&mut b, 1, 1, gamma);
    for j in 2..=n {
        put(&mut b, 1, j, v(n + 1 - j));
    }
    for i in 2..=(n - 1) / 2 + 1 {
        for j in i..=n + 1 - i {
            let x = b[(i - 2, j - 2)] + (v(n + 1 - j) * v(n + 1 - i) - v(i - 1) * v(j - 1)) / gamma;
            put(&mut b, i, j, x);
        }
    }
    b *= T::one() / r0;
    Ok(b)
}

/// Symmetric Toeplitz matrix stored as its first column.
///
/// ```
/// use densela::linalg::SymmetricToeplitz;
///
/// let t = SymmetricToeplitz::new(vec![4.0_f64, 2.0, 1.0]);
/// let b = t.mul(&[1.0, 1.0, 1.0]);
/// assert!((b[0] - 7.0).abs() < 1e-12 && (b[1] - 8.0).abs() < 1e-12);
/// let x = t.solve(&b).unwrap();
/// assert!(x.iter().all(|xi| (xi - 1.0).abs() < 1e-12));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricToeplitz<T> {
    r: Vec<T>,
}

impl<T: FloatScalar> SymmetricToeplitz<T> {
    pub fn new(r: Vec<T>) -> Self {
        Self { r }
    }

    pub fn dim(&self) -> usize {
        self.r.len()
    }

    /// First column.
    pub fn coefficients(&self) -> &[T] {
        &self.r
    }

    /// Dense copy.
    pub fn to_matrix(&self) -> Matrix<T> {
        Matrix::from_fn(self.dim(), self.dim(), |i, j| self.r[i.abs_diff(j)])
    }

    /// Solves `T x = b` with [`solve_levinson_system`].
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, LinalgError> {
        solve_levinson_system(&self.r, b)
    }

    /// `T^-1` with [`trench_inverse`].
    pub fn inverse(&self) -> Result<Matrix<T>, LinalgError> {
        trench_inverse(&self.r)
    }

    /// Solution of the Yule-Walker equations built on these coefficients
    /// (see [`durbin`]).
    pub fn durbin(&self) -> Result<Vec<T>, LinalgError> {
        durbin(&self.r)
    }

    /// `T x` through a circulant embedding of `T`, in `O(n log n)`.
    ///
    /// # Panics
    ///
    /// If `x.len() != self.dim()`.
    pub fn mul(&self, x: &[T]) -> Vec<T> {
        let n = self.dim();
        assert!(x.len() == n, "dimension mismatch: vector of length {}, expected {}", x.len(), n);
        if n == 0 {
            return Vec::new();
        }
        let len = padded_len(2 * n);
        // first column of the circulant: r_0..r_{n-1}, zeros, r_{n-1}..r_1
        let mut c = to_complex(&self.r, len);
        for k in 1..n {
            c[len - k] = Complex::new(self.r[k], T::zero());
        }
        let mut z = to_complex(x, len);
        let plan = FftPlan::new(len);
        plan.forward(&mut c);
        plan.forward(&mut z);
        for (zi, ci) in z.iter_mut().zip(c.iter()) {
            *zi = *zi * *ci;
        }
        plan.inverse(&mut z);
        z[..n].iter().map(|zi| zi.re).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{LinearSystemSolver, LuDecomposition};

    fn autocovariances(n: usize) -> Vec<f64> {
        // MA(2) process 1 + 0.6 B - 0.3 B^2
        let theta = [1.0, 0.6, -0.3];
        (0..n)
            .map(|k| (0..3).filter(|i| i + k < 3).map(|i| theta[i] * theta[i + k]).sum::<f64>())
            .collect()
    }

    #[test]
    fn durbin_solves_yule_walker() {
        let r = autocovariances(7);
        let y = durbin(&r).unwrap();
        assert_eq!(y.len(), 6);
        let t = SymmetricToeplitz::new(r[..6].to_vec()).to_matrix();
        let ty = t.times_vec(&y);
        for k in 0..6 {
            assert!((ty[k] + r[k + 1]).abs() < 1e-12);
        }
    }

    #[test]
    fn levinson_matches_lu() {
        let t = SymmetricToeplitz::new(autocovariances(8));
        let b = [1.0, -2.0, 0.5, 3.0, 0.0, 1.5, -1.0, 2.0];
        let x = t.solve(&b).unwrap();
        let y = LuDecomposition::new(&t.to_matrix()).unwrap().solve(&b).unwrap();
        for (a, e) in x.iter().zip(y.iter()) {
            assert!((a - e).abs() < 1e-11);
        }
    }

    #[test]
    fn levinson_general_right_hand_side() {
        // AR(1) autocovariances with a right-hand side unrelated to r
        let r = [1.0_f64, 0.5, 0.25, 0.125];
        let b = [1.0, 2.0, 3.0, 4.0];
        let x = solve_levinson_system(&r, &b).unwrap();
        let expected = [0.0, 2.0 / 3.0, 1.0, 10.0 / 3.0];
        for (a, e) in x.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-13);
        }

        let r = [4.0_f64, -1.0, 0.5, 0.25, 0.0, 0.1];
        let b = [1.0, -2.0, 0.5, 3.0, 0.0, 1.5];
        let x = solve_levinson_system(&r, &b).unwrap();
        let tx = SymmetricToeplitz::new(r.to_vec()).to_matrix().times_vec(&x);
        for (a, e) in tx.iter().zip(b.iter()) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn trench_matches_lu_inverse() {
        for n in 1..8 {
            let t = SymmetricToeplitz::new(autocovariances(n));
            let inv = t.inverse().unwrap();
            let expected = LuDecomposition::new(&t.to_matrix()).unwrap().inverse().unwrap();
            assert!(inv.distance(&expected) < 1e-11, "order {}", n);
        }
    }

    #[test]
    fn fft_product_matches_dense() {
        let t = SymmetricToeplitz::new(autocovariances(5));
        let x = [0.3, -1.0, 2.0, 0.0, 4.0];
        let fast = t.mul(&x);
        let dense = t.to_matrix().times_vec(&x);
        for (a, e) in fast.iter().zip(dense.iter()) {
            assert!((a - e).abs() < 1e-13);
        }
    }

    #[test]
    fn indefinite_coefficients_fail() {
        let t = SymmetricToeplitz::new(vec![1.0, 2.0, 0.0]);
        assert_eq!(t.solve(&[1.0, 1.0, 1.0]), Err(LinalgError::CholeskyFailed));
        assert_eq!(durbin(&[0.0, 1.0]), Err(LinalgError::CholeskyFailed));
        assert_eq!(t.solve(&[1.0]), Err(LinalgError::IncompatibleDimensions));
    }
}
