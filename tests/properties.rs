use approx::assert_relative_eq;
use densela::linalg::symmetric::{is_positive_definite, lcholesky};
use densela::linalg::toeplitz::solve_levinson_system;
use densela::linalg::triangular::lower;
use densela::linalg::{
    moore_penrose, HouseholderQr, HouseholderReflection, LinearSystemSolver, LuAlgorithm, LuDecomposition,
    SymmetricToeplitz,
};
use densela::{DynVector, LinalgError, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-10;

fn random_matrix(rng: &mut StdRng, m: usize, n: usize) -> Matrix<f64> {
    let data: Vec<f64> = (0..m * n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Matrix::from_vec(m, n, data)
}

fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn assert_near(a: &Matrix<f64>, b: &Matrix<f64>, tol: f64, msg: &str) {
    let scale = b.max_abs().max(1.0);
    assert!(a.distance(b) <= tol * scale, "{}: distance {:e}", msg, a.distance(b));
}

/// Determinant by cofactor expansion along the first row.
fn cofactor_det(a: &Matrix<f64>) -> f64 {
    let n = a.nrows();
    if n == 1 {
        return a[(0, 0)];
    }
    (0..n)
        .map(|j| {
            let rows: Vec<usize> = (1..n).collect();
            let cols: Vec<usize> = (0..n).filter(|&c| c != j).collect();
            let minor = a.select_rows(&rows).select_columns(&cols);
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            sign * a[(0, j)] * cofactor_det(&minor)
        })
        .sum()
}

// ── LU ───────────────────────────────────────────────────────────────

#[test]
fn lu_reproduces_the_permuted_matrix() {
    let mut rng = StdRng::seed_from_u64(1);
    for n in 1..=6 {
        let a = random_matrix(&mut rng, n, n);
        for algorithm in [LuAlgorithm::Gauss, LuAlgorithm::CroutDoolittle] {
            let mut lu = LuDecomposition::default().with_algorithm(algorithm);
            lu.decompose(&a).unwrap();
            let pa = a.select_rows(lu.pivot());
            assert_near(&(&lu.l() * &lu.u()), &pa, TOL, "PA = LU");
            assert_relative_eq!(lu.determinant().unwrap(), cofactor_det(&a), epsilon = 1e-12);
        }
    }
}

#[test]
fn lu_concrete_example() {
    let a = Matrix::from_rows(2, 2, &[4.0_f64, 3.0, 6.0, 3.0]);
    let lu = a.lu().unwrap();
    assert_eq!(lu.pivot(), &[1, 0]);
    assert_eq!(lu.pivot_sign(), -1.0);
    assert_eq!(lu.u().as_slice(), &[6.0, 0.0, 3.0, 1.0]);
    assert_relative_eq!(lu.l()[(1, 0)], 2.0 / 3.0, epsilon = 1e-15);
    assert_relative_eq!(lu.determinant().unwrap(), -6.0, epsilon = 1e-14);
}

// ── QR ───────────────────────────────────────────────────────────────

#[test]
fn qr_is_orthogonal_times_triangular() {
    let mut rng = StdRng::seed_from_u64(2);
    let a = random_matrix(&mut rng, 9, 5);
    let qr = HouseholderQr::new(&a).unwrap();
    let q = qr.q();
    let r = qr.r();
    assert_near(&(&q.transpose() * &q), &Matrix::identity(5), TOL, "Q'Q = I");
    assert_near(&(&q * &r), &a, TOL, "QR = A");
    for j in 0..5 {
        assert!(r.column(j).drop(j + 1, 0).is_zero(0.0));
    }
}

#[test]
fn least_squares_minimizes_the_residual() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..5 {
        let a = random_matrix(&mut rng, 10, 4);
        let b = random_vec(&mut rng, 10);
        let ls = a.qr().unwrap().least_squares(&b).unwrap();

        // normal equations through LU
        let at = a.transpose();
        let expected = (&at * &a).solve(&at.times_vec(&b)).unwrap();
        for (x, e) in ls.coefficients.iter().zip(expected.iter()) {
            assert_relative_eq!(*x, *e, epsilon = 1e-9);
        }

        // any perturbation increases the residual
        let rss = |x: &[f64]| -> f64 {
            let f = a.times_vec(x);
            f.iter().zip(b.iter()).map(|(fi, bi)| (bi - fi) * (bi - fi)).sum()
        };
        let best = rss(&ls.coefficients);
        assert_relative_eq!(best, ls.ssq(), epsilon = 1e-12);
        let mut moved = ls.coefficients.clone();
        moved[2] += 1e-3;
        assert!(rss(&moved) > best);
    }
}

// ── Cholesky ─────────────────────────────────────────────────────────

#[test]
fn cholesky_round_trip() {
    let mut rng = StdRng::seed_from_u64(4);
    let x = random_matrix(&mut rng, 8, 5);
    let s = &x.transpose() * &x;
    assert!(is_positive_definite(&s.view()));

    let mut l = s.clone();
    lcholesky(&mut l.view_mut()).unwrap();
    assert_near(&(&l * &l.transpose()), &s, TOL, "LL' = S");
}

#[test]
fn negative_eigenvalue_is_detected() {
    // eigenvalues 3 and -1
    let s = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 1.0]);
    assert!(!is_positive_definite(&s.view()));
    let mut l = s.clone();
    assert_eq!(lcholesky(&mut l.view_mut()), Err(LinalgError::CholeskyFailed));
}

// ── Triangular ───────────────────────────────────────────────────────

#[test]
fn rsolve_undoes_lmul() {
    let mut rng = StdRng::seed_from_u64(5);
    for n in [1, 3, 7] {
        let mut l = random_matrix(&mut rng, n, n);
        for i in 0..n {
            l[(i, i)] = 1.0 + l[(i, i)].abs();
        }
        let x = random_vec(&mut rng, n);
        let mut y = DynVector::from_slice(&x);
        lower::lmul(&l.view(), &mut y.block_mut());
        lower::rsolve(&l.view(), &mut y.block_mut(), 0.0).unwrap();
        for (yi, xi) in y.as_slice().iter().zip(x.iter()) {
            assert_relative_eq!(*yi, *xi, epsilon = 1e-12);
        }
    }
}

// ── Moore-Penrose ────────────────────────────────────────────────────

#[test]
fn pseudo_inverse_identities() {
    let mut rng = StdRng::seed_from_u64(6);
    // full rank, rank deficient tall, rank deficient wide
    let full = random_matrix(&mut rng, 6, 4);
    let thin = &random_matrix(&mut rng, 6, 2) * &random_matrix(&mut rng, 2, 4);
    let wide = &random_matrix(&mut rng, 3, 1) * &random_matrix(&mut rng, 1, 5);
    for g in [full, thin, wide] {
        let p = moore_penrose(&g).unwrap();
        assert_near(&(&(&g * &p) * &g), &g, 1e-8, "GPG = G");
        assert_near(&(&(&p * &g) * &p), &p, 1e-8, "PGP = P");
    }
}

// ── Householder ──────────────────────────────────────────────────────

#[test]
fn reflection_maps_onto_the_first_axis_and_is_an_involution() {
    let mut rng = StdRng::seed_from_u64(7);
    let x = DynVector::from_vec(random_vec(&mut rng, 6));
    let h = HouseholderReflection::from(&x.block());

    let mut y = x.clone();
    h.transform(&mut y.block_mut());
    assert_relative_eq!(y[0].abs(), x.norm(), epsilon = 1e-14);
    assert_relative_eq!(y[0], h.mu(), epsilon = 1e-14);
    assert!(y.block().drop(1, 0).is_zero(1e-14));

    h.transform(&mut y.block_mut());
    for i in 0..6 {
        assert_relative_eq!(y[i], x[i], epsilon = 1e-14);
    }
}

// ── Toeplitz ─────────────────────────────────────────────────────────

#[test]
fn levinson_matches_direct_solve() {
    let mut rng = StdRng::seed_from_u64(8);
    for n in [1, 2, 5, 12, 20] {
        // autocovariances of a random finite moving average
        let theta = random_vec(&mut rng, 4);
        let r: Vec<f64> = (0..n)
            .map(|k| {
                let own = if k == 0 { 1.0 } else { 0.0 };
                own + (0..4).filter(|i| i + k < 4).map(|i| theta[i] * theta[i + k]).sum::<f64>()
            })
            .collect();
        let b = random_vec(&mut rng, n);
        let x = solve_levinson_system(&r, &b).unwrap();
        let t = SymmetricToeplitz::new(r.clone());
        let expected = t.to_matrix().solve(&b).unwrap();
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert_relative_eq!(*xi, *ei, epsilon = 1e-9);
        }
        let tb = t.mul(&x);
        for (yi, bi) in tb.iter().zip(b.iter()) {
            assert_relative_eq!(*yi, *bi, epsilon = 1e-9);
        }
    }
}
