//! Moore-Penrose pseudo-inverse through a rank-revealing Cholesky
//! factorization of the normal matrix (Courrieu, 2005).

use log::debug;

use crate::linalg::symmetric::{lcholesky, xtx};
use crate::linalg::triangular::{lower, upper};
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Relative tolerance on the diagonal of `G' G` below which a column is
/// taken as linearly dependent on the previous ones.
const RANK_TOLERANCE: f64 = 1e-9;

/// Pseudo-inverse `G+` of any matrix, rank-deficient or not.
///
/// With `A = G' G` (or `G G'` for wide input), a Cholesky-like elimination
/// of `A` drops every column whose pivot falls below `1e-9` times the
/// smallest positive diagonal entry of `A`. The kept columns form a
/// full-column-rank `L` with `L L' = A`, and
///
/// `G+ = L (L' L)^-1 (L' L)^-1 L' G'`
///
/// computed with two triangular solves against the Cholesky factor of
/// `L' L`. The number of kept columns is the numerical rank of `G`.
/// Entries below machine epsilon are cleaned to zero.
///
/// A zero matrix has a zero pseudo-inverse.
///
/// ```
/// use densela::Matrix;
/// use densela::linalg::moore_penrose;
///
/// // rank one
/// let g = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// let p = moore_penrose(&g).unwrap();
/// assert!((&(&g * &p) * &g).distance(&g) < 1e-12);
/// assert!((p[(0, 1)] - 0.08).abs() < 1e-12);
/// ```
pub fn moore_penrose<T: FloatScalar>(g: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    let (m, n) = (g.nrows(), g.ncols());
    if m < n {
        return Ok(moore_penrose(&g.transpose())?.transpose());
    }

    let a = xtx(g);
    let min_diag = a
        .diag()
        .iter()
        .filter(|d| *d > T::zero())
        .fold(T::infinity(), |acc, d| acc.min(d));
    if min_diag == T::infinity() {
        return Ok(Matrix::zeros(n, m));
    }
    let tol = min_diag * T::lit(RANK_TOLERANCE);

    // full-rank factor L (n x rank), column r built from column k of A
    let mut l = Matrix::zeros(n, n);
    let mut rank = 0;
    for k in 0..n {
        for i in k..n {
            let s = l.row(i).extract(0, rank, 1).dot(&l.row(k).extract(0, rank, 1));
            l[(i, rank)] = a[(i, k)] - s;
        }
        let d = l[(k, rank)];
        if d > tol {
            let lkk = d.sqrt();
            l[(k, rank)] = lkk;
            l.column_mut(rank).drop_mut(k + 1, 0).scale(T::one() / lkk);
            rank += 1;
        } else {
            l.column_mut(rank).drop_mut(k, 0).set_all(T::zero());
        }
    }
    if rank < n {
        debug!("moore-penrose: rank {} of {} columns", rank, n);
    }
    let l = l.sub_matrix(0, n, 0, rank).to_matrix();

    // W = (L' L)^-1 L' through the Cholesky factor K of L' L
    let mut k = xtx(&l);
    lcholesky(&mut k.view_mut())?;
    let mut w = l.transpose();
    lower::rsolve_matrix(&k.view(), &mut w.view_mut(), T::zero())?;
    upper::rsolve_matrix(&k.view().transpose(), &mut w.view_mut(), T::zero())?;

    // G+ = W' W G'
    let mut p = &w.transpose() * &(&w * &g.transpose());
    p.clean(T::epsilon());
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_penrose(g: &Matrix<f64>, p: &Matrix<f64>) {
        assert_eq!((p.nrows(), p.ncols()), (g.ncols(), g.nrows()));
        let gp = g * p;
        let pg = p * g;
        assert!((&gp * g).distance(g) < 1e-8);
        assert!((&pg * p).distance(p) < 1e-8);
        assert!(gp.is_symmetric(1e-8));
        assert!(pg.is_symmetric(1e-8));
    }

    #[test]
    fn full_column_rank_matches_normal_equations() {
        let g = Matrix::from_rows(4, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let p = moore_penrose(&g).unwrap();
        let gt = g.transpose();
        let expected = &crate::linalg::symmetric::inverse(&(&gt * &g)).unwrap() * &gt;
        assert!(p.distance(&expected) < 1e-12);
        assert_penrose(&g, &p);
    }

    #[test]
    fn square_invertible_gives_inverse() {
        let g = Matrix::from_rows(3, 3, &[2.0_f64, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        let p = moore_penrose(&g).unwrap();
        assert!((&g * &p).distance(&Matrix::identity(3)) < 1e-12);
    }

    #[test]
    fn rank_deficient_tall_matrix() {
        // third column = first + second
        let g = Matrix::from_rows(4, 3, &[
            1.0_f64, 2.0, 3.0,
            0.0, 1.0, 1.0,
            4.0, -1.0, 3.0,
            2.0, 2.0, 4.0,
        ]);
        let p = moore_penrose(&g).unwrap();
        assert_penrose(&g, &p);
    }

    #[test]
    fn wide_matrix_goes_through_the_transpose() {
        let g = Matrix::from_rows(2, 4, &[1.0_f64, 2.0, 0.0, -1.0, 2.0, 4.0, 0.0, -2.0]);
        let p = moore_penrose(&g).unwrap();
        assert_penrose(&g, &p);
        assert!(p.distance(&moore_penrose(&g.transpose()).unwrap().transpose()) < 1e-14);
    }

    #[test]
    fn zero_matrix() {
        let p = moore_penrose(&Matrix::<f64>::zeros(3, 2)).unwrap();
        assert_eq!((p.nrows(), p.ncols()), (2, 3));
        assert!(p.is_zero(0.0));
    }
}
