use crate::traits::FloatScalar;

use super::{DataBlock, DataBlockMut};

/// One step of the scaled sum of squares: after all values have been fed,
/// `scale * sqrt(ssq)` is the Euclidean norm.
///
/// The largest magnitude seen so far is factored out before squaring, so
/// neither overflow nor underflow can occur for representable inputs.
#[inline]
pub(crate) fn accumulate_scaled<T: FloatScalar>(x: T, scale: &mut T, ssq: &mut T) {
    if x == T::zero() {
        return;
    }
    let ax = x.abs();
    if *scale < ax {
        let r = *scale / ax;
        *ssq = T::one() + *ssq * r * r;
        *scale = ax;
    } else {
        let r = ax / *scale;
        *ssq = *ssq + r * r;
    }
}

impl<T: FloatScalar> DataBlock<'_, T> {
    /// Euclidean norm, computed without overflow.
    ///
    /// ```
    /// use densela::DataBlock;
    /// let a = [3.0e200_f64, 4.0e200];
    /// assert!((DataBlock::from_slice(&a).nrm2() - 5.0e200).abs() < 1e186);
    /// ```
    pub fn nrm2(&self) -> T {
        let mut scale = T::zero();
        let mut ssq = T::one();
        for x in self.iter() {
            accumulate_scaled(x, &mut scale, &mut ssq);
        }
        scale * ssq.sqrt()
    }

    /// Plain sum of squares.
    pub fn ssq(&self) -> T {
        let mut s = T::zero();
        for x in self.iter() {
            s = s + x * x;
        }
        s
    }

    /// Sum of absolute values.
    pub fn nrm1(&self) -> T {
        let mut s = T::zero();
        for x in self.iter() {
            s = s + x.abs();
        }
        s
    }

    /// Largest absolute value (0 for an empty view).
    pub fn nrm_inf(&self) -> T {
        let mut m = T::zero();
        for x in self.iter() {
            let a = x.abs();
            if a > m {
                m = a;
            }
        }
        m
    }

    /// Index of the first element with the largest absolute value.
    pub fn max_abs_index(&self) -> Option<usize> {
        let mut best: Option<(usize, T)> = None;
        for (i, x) in self.iter().enumerate() {
            let a = x.abs();
            match best {
                Some((_, m)) if a <= m => {}
                _ => best = Some((i, a)),
            }
        }
        best.map(|(i, _)| i)
    }
}

impl<T: FloatScalar> DataBlockMut<'_, T> {
    pub fn nrm2(&self) -> T {
        self.as_view().nrm2()
    }

    pub fn ssq(&self) -> T {
        self.as_view().ssq()
    }

    pub fn nrm_inf(&self) -> T {
        self.as_view().nrm_inf()
    }
}
