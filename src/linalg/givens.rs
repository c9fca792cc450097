use crate::datablock::DataBlockMut;
use crate::traits::FloatScalar;
use crate::view::MatrixViewMut;

/// `sqrt(x^2 + y^2)` without intermediate overflow or underflow.
///
/// The larger magnitude is factored out before squaring.
///
/// ```
/// use densela::linalg::hypotenuse;
/// assert_eq!(hypotenuse(3.0_f64, -4.0), 5.0);
/// assert!((hypotenuse(3e200_f64, 4e200) / 5e200 - 1.0).abs() < 1e-15);
/// ```
pub fn hypotenuse<T: FloatScalar>(x: T, y: T) -> T {
    let (ax, ay) = (x.abs(), y.abs());
    let (big, small) = if ax >= ay { (ax, ay) } else { (ay, ax) };
    if big == T::zero() {
        return T::zero();
    }
    let r = small / big;
    big * (T::one() + r * r).sqrt()
}

/// Plane rotation `G = [c s; -s c]` that maps `(a, b)` onto `(r, 0)`.
///
/// ```
/// use densela::linalg::GivensRotation;
/// let g = GivensRotation::new(3.0_f64, 4.0);
/// let (x, y) = g.apply(3.0, 4.0);
/// assert!((x - 5.0).abs() < 1e-15 && y.abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GivensRotation<T> {
    c: T,
    s: T,
    r: T,
}

impl<T: FloatScalar> GivensRotation<T> {
    /// Rotation zeroing `b` against `a`. `r >= 0` unless `b == 0`, in
    /// which case the rotation is the identity and `r = a`.
    pub fn new(a: T, b: T) -> Self {
        if b == T::zero() {
            return Self {
                c: T::one(),
                s: T::zero(),
                r: a,
            };
        }
        let r = hypotenuse(a, b);
        Self {
            c: a / r,
            s: b / r,
            r,
        }
    }

    #[inline]
    pub fn c(&self) -> T {
        self.c
    }

    #[inline]
    pub fn s(&self) -> T {
        self.s
    }

    /// Norm of the pair the rotation was built from.
    #[inline]
    pub fn r(&self) -> T {
        self.r
    }

    /// Rotated pair `(c x + s y, -s x + c y)`.
    #[inline]
    pub fn apply(&self, x: T, y: T) -> (T, T) {
        (self.c * x + self.s * y, self.c * y - self.s * x)
    }

    /// Rotates entries `i` and `j` of a vector.
    pub fn apply_to(&self, x: &mut DataBlockMut<'_, T>, i: usize, j: usize) {
        let (a, b) = self.apply(x[i], x[j]);
        x[i] = a;
        x[j] = b;
    }

    /// Rotates rows `i` and `j` of `m` (left multiplication).
    pub fn apply_rows(&self, m: &mut MatrixViewMut<'_, T>, i: usize, j: usize) {
        let g = *self;
        m.transform_row_pair(i, j, move |x, y| g.apply(x, y));
    }

    /// Rotates columns `i` and `j` of `m` (right multiplication by `G'`).
    pub fn apply_columns(&self, m: &mut MatrixViewMut<'_, T>, i: usize, j: usize) {
        let g = *self;
        m.transform_column_pair(i, j, move |x, y| g.apply(x, y));
    }
}
