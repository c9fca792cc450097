use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use crate::traits::{FloatScalar, Scalar};

use super::Matrix;

// ── Aggregation ─────────────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Sum of the diagonal elements.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// assert_eq!(m.trace(), 5.0);
    /// ```
    pub fn trace(&self) -> T {
        self.diag().sum()
    }

    /// Sum of all elements.
    pub fn sum(&self) -> T {
        let mut s = T::zero();
        for &x in &self.data {
            s = s + x;
        }
        s
    }

    /// Applies `f` to every element, producing a new matrix.
    pub fn map(&self, f: impl Fn(T) -> T) -> Matrix<T> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// ── Norms and predicates ────────────────────────────────────────────

impl<T: FloatScalar> Matrix<T> {
    /// Frobenius norm, scaled against overflow.
    pub fn frobenius_norm(&self) -> T {
        self.view().frobenius_norm()
    }

    /// Maximum absolute row sum.
    ///
    /// ```
    /// use densela::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, -2.0, 3.0, 4.0]);
    /// assert_eq!(m.norm_inf(), 7.0);
    /// assert_eq!(m.norm_1(), 6.0);
    /// ```
    pub fn norm_inf(&self) -> T {
        self.view().rows().fold(T::zero(), |m, r| m.max(r.nrm1()))
    }

    /// Maximum absolute column sum.
    pub fn norm_1(&self) -> T {
        self.view().columns().fold(T::zero(), |m, c| m.max(c.nrm1()))
    }

    /// Largest absolute value.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |m, &x| m.max(x.abs()))
    }

    /// `true` when every element is within `[-eps, eps]`.
    pub fn is_zero(&self, eps: T) -> bool {
        self.data.iter().all(|x| x.abs() <= eps)
    }

    /// `true` for a square matrix with `|a_ij - a_ji| <= eps`.
    pub fn is_symmetric(&self, eps: T) -> bool {
        if !self.is_square() {
            return false;
        }
        for j in 0..self.ncols {
            for i in j + 1..self.nrows {
                if (self[(i, j)] - self[(j, i)]).abs() > eps {
                    return false;
                }
            }
        }
        true
    }

    /// `true` when every off-diagonal element is within `[-eps, eps]`.
    pub fn is_diagonal(&self, eps: T) -> bool {
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                if i != j && self[(i, j)].abs() > eps {
                    return false;
                }
            }
        }
        true
    }

    /// Snaps every element within `[-eps, eps]` to exactly zero.
    pub fn clean(&mut self, eps: T) {
        for x in self.data.iter_mut() {
            if x.abs() <= eps {
                *x = T::zero();
            }
        }
    }

    /// Snaps every element lying within `eps` of a multiple of `step` to
    /// that multiple.
    ///
    /// ```
    /// use densela::Matrix;
    /// let mut m = Matrix::from_rows(1, 3, &[0.4999999999_f64, 1.02, -2.0000000001]);
    /// m.clean_to_multiple(0.5, 1e-8);
    /// assert_eq!(m.as_slice(), &[0.5, 1.02, -2.0]);
    /// ```
    pub fn clean_to_multiple(&mut self, step: T, eps: T) {
        assert!(step > T::zero(), "step must be positive");
        for x in self.data.iter_mut() {
            let snapped = (*x / step).round() * step;
            if (*x - snapped).abs() <= eps {
                *x = snapped;
            }
        }
    }

    /// Forces exact symmetry by averaging `a_ij` and `a_ji`.
    pub fn reinforce_symmetry(&mut self) {
        crate::linalg::symmetric::reinforce_symmetry(self);
    }

    /// Euclidean distance between two matrices of the same shape.
    pub fn distance(&self, other: &Matrix<T>) -> T {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch"
        );
        crate::DataBlock::from_slice(&self.data).distance(&crate::DataBlock::from_slice(&other.data))
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.nrows;
        let n = self.ncols;

        let mut widths: Vec<usize> = alloc::vec![0; n];
        for j in 0..n {
            for i in 0..m {
                let w = WriteCounting::count(|wc| write!(wc, "{}", self[(i, j)]));
                if w > widths[j] {
                    widths[j] = w;
                }
            }
        }

        for i in 0..m {
            write!(f, "│")?;
            for j in 0..n {
                if j > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:>width$}", self[(i, j)], width = widths[j])?;
            }
            write!(f, "│")?;
            if i < m - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

struct WriteCounting {
    count: usize,
}

impl WriteCounting {
    fn count(f: impl FnOnce(&mut Self) -> fmt::Result) -> usize {
        let mut wc = WriteCounting { count: 0 };
        let _ = f(&mut wc);
        wc.count
    }
}

impl fmt::Write for WriteCounting {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.count += s.chars().count();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_sum_map() {
        let m = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        assert_eq!(m.trace(), 5.0);
        assert_eq!(m.sum(), 10.0);
        assert_eq!(m.map(|x| x * x)[(1, 1)], 16.0);
    }

    #[test]
    fn norms() {
        let m = Matrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, -4.0]);
        assert!((m.frobenius_norm() - 5.0).abs() < 1e-15);
        assert_eq!(m.max_abs(), 4.0);
        assert_eq!(m.norm_1(), 4.0);
        assert_eq!(m.norm_inf(), 4.0);
    }

    #[test]
    fn predicates() {
        let s = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0 + 1e-12, 3.0]);
        assert!(s.is_symmetric(1e-10));
        assert!(!s.is_symmetric(1e-14));
        assert!(!Matrix::<f64>::zeros(2, 3).is_symmetric(1.0));
        assert!(Matrix::diagonal(&[1.0_f64, 2.0]).is_diagonal(0.0));
        assert!(!s.is_diagonal(0.5));
    }

    #[test]
    fn clean_and_symmetry() {
        let mut m = Matrix::from_rows(2, 2, &[1.0_f64, 1e-17, 3.0, -1e-16]);
        m.clean(1e-15);
        assert_eq!(m.as_slice(), &[1.0, 3.0, 0.0, 0.0]);
        m.reinforce_symmetry();
        assert_eq!(m[(0, 1)], 1.5);
        assert_eq!(m[(1, 0)], 1.5);
    }

    #[test]
    fn distance() {
        let a = Matrix::<f64>::zeros(1, 2);
        let b = Matrix::from_rows(1, 2, &[3.0_f64, 4.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn display() {
        let m = Matrix::from_rows(2, 2, &[1.0_f64, 20.0, 3.0, 4.0]);
        let s = alloc::format!("{}", m);
        assert_eq!(s, "│1  20│\n│3   4│");
    }
}
