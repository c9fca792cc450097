//! Complex FFT used by the Toeplitz multiply.
//!
//! With `std` the transforms are planned by `rustfft`. Without it an
//! iterative radix-2 kernel runs instead, which needs power-of-two lengths.

use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::sync::Arc;

use num_complex::Complex;
#[cfg(feature = "std")]
use rustfft::{Fft, FftPlanner};

use crate::traits::FloatScalar;

/// Smallest power of two `>= n` (1 for `n == 0`).
pub(crate) fn padded_len(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Forward and inverse transforms of a fixed length.
///
/// The inverse is scaled by `1/n`, so `inverse(forward(x)) == x`.
pub(crate) struct FftPlan<T: FloatScalar> {
    len: usize,
    #[cfg(feature = "std")]
    forward: Arc<dyn Fft<T>>,
    #[cfg(feature = "std")]
    inverse: Arc<dyn Fft<T>>,
    #[cfg(not(feature = "std"))]
    _marker: core::marker::PhantomData<T>,
}

impl<T: FloatScalar> FftPlan<T> {
    #[cfg(feature = "std")]
    pub(crate) fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
        }
    }

    #[cfg(not(feature = "std"))]
    pub(crate) fn new(len: usize) -> Self {
        assert!(len.is_power_of_two(), "fft length {} is not a power of two", len);
        Self {
            len,
            _marker: core::marker::PhantomData,
        }
    }

    pub(crate) fn forward(&self, data: &mut [Complex<T>]) {
        assert_eq!(data.len(), self.len, "fft length mismatch");
        #[cfg(feature = "std")]
        self.forward.process(data);
        #[cfg(not(feature = "std"))]
        radix2_in_place(data, false);
    }

    pub(crate) fn inverse(&self, data: &mut [Complex<T>]) {
        assert_eq!(data.len(), self.len, "fft length mismatch");
        #[cfg(feature = "std")]
        self.inverse.process(data);
        #[cfg(not(feature = "std"))]
        radix2_in_place(data, true);

        let inv_n = T::one() / <T as FloatScalar>::from_usize(self.len);
        for z in data.iter_mut() {
            *z = z.scale(inv_n);
        }
    }
}

#[cfg(any(test, not(feature = "std")))]
fn bit_reverse_permutation<T>(data: &mut [Complex<T>]) {
    let n = data.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// Unscaled in-place transform. `data.len()` must be a power of two.
#[cfg(any(test, not(feature = "std")))]
fn radix2_in_place<T: FloatScalar>(data: &mut [Complex<T>], inverse: bool) {
    let n = data.len();
    assert!(n.is_power_of_two(), "fft length {} is not a power of two", n);
    if n <= 1 {
        return;
    }

    bit_reverse_permutation(data);

    let sign = if inverse { T::one() } else { -T::one() };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle_step = sign * T::lit(core::f64::consts::PI) / <T as FloatScalar>::from_usize(half);
        let mut start = 0;
        while start < n {
            for k in 0..half {
                let angle = angle_step * <T as FloatScalar>::from_usize(k);
                let w = Complex::new(angle.cos(), angle.sin());
                let even = start + k;
                let odd = even + half;
                let t = w * data[odd];
                data[odd] = data[even] - t;
                data[even] = data[even] + t;
            }
            start += len;
        }
        len *= 2;
    }
}

/// Zero-padded complex copy of a real sequence.
pub(crate) fn to_complex<T: FloatScalar>(x: &[T], len: usize) -> Vec<Complex<T>> {
    let mut out = alloc::vec![Complex::new(T::zero(), T::zero()); len];
    for (z, &v) in out.iter_mut().zip(x.iter()) {
        z.re = v;
    }
    out
}
