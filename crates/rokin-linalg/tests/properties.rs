use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rokin_linalg::{
    nnls, FixedMat, LinalgError, Matrix, Matrix3x3, Matrix4x4, Quaternion, Vector3, Workspace,
};

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    let data = (0..rows * cols).map(|_| rng.random_range(-1.0..1.0)).collect();
    Matrix::from_vec(rows, cols, data).expect("shape matches data")
}

fn random_unit_quaternion(rng: &mut StdRng) -> Result<Quaternion, LinalgError> {
    let axis = Vector3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    );
    Quaternion::from_axis_angle(axis, rng.random_range(-3.1..3.1))
}

fn assert_matrix_eq(a: &Matrix, b: &Matrix, eps: f32) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.flat().iter().zip(b.flat()) {
        assert_relative_eq!(x, y, epsilon = eps);
    }
}

#[test]
fn inverse_is_two_sided() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(3);
    for n in 1..7 {
        let mut a = random_matrix(&mut rng, n, n);
        for i in 0..n {
            a.set(i, i, a.get(i, i) + n as f32);
        }
        let mut inv = Matrix::new(n, n);
        a.inverse(&mut inv)?;

        let mut left = Matrix::new(n, n);
        left.mul(&a, &inv)?;
        let mut right = Matrix::new(n, n);
        right.mul(&inv, &a)?;
        assert_matrix_eq(&left, &Matrix::eye(n), 1e-4);
        assert_matrix_eq(&right, &Matrix::eye(n), 1e-4);
    }
    Ok(())
}

#[test]
fn svd_reconstructs_any_shape() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let m = rng.random_range(1..7);
        let n = rng.random_range(1..7);
        let a = random_matrix(&mut rng, m, n);
        let svd = a.svd()?;
        assert_eq!(svd.s.len(), m.min(n));
        assert!(svd.s.windows(2).all(|w| w[0] >= w[1]));
        assert_matrix_eq(&svd.reconstruct()?, &a, 1e-4);
    }
    Ok(())
}

#[test]
fn pseudo_inverse_reuses_workspace() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(9);
    let mut ws = Workspace::new();
    for n in 2..8 {
        let mut j = random_matrix(&mut rng, 3, n);
        for i in 0..3.min(n) {
            j.set(i, i, j.get(i, i) + 2.0);
        }
        let mut pinv = Matrix::new(n, 3);
        let rank = j.pseudo_inverse_in(&mut pinv, &mut ws)?;
        assert_eq!(rank, 3.min(n));

        let mut jp = Matrix::new(3, 3);
        jp.mul(&j, &pinv)?;
        let mut jpj = Matrix::new(3, n);
        jpj.mul(&jp, &j)?;
        assert_matrix_eq(&jpj, &j, 1e-4);
    }
    Ok(())
}

#[test]
fn rotation_matrices_are_orthonormal() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..50 {
        let q = random_unit_quaternion(&mut rng)?;
        let mut r = Matrix3x3::eye();
        r.orientation(&q);

        let rtr = r.transpose() * r;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(rtr[(i, j)], expected, epsilon = 1e-5);
            }
        }
        assert_relative_eq!(r.det(), 1.0, epsilon = 1e-5);

        // q and -q are the same rotation
        let back = r.quaternion();
        assert_relative_eq!(back.dot(&q).abs(), 1.0, epsilon = 1e-5);
    }
    Ok(())
}

#[test]
fn homogeneous_inverse_matches_general_inverse() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let q = random_unit_quaternion(&mut rng)?;
        let t = Vector3::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
        );
        let mut h = Matrix4x4::eye();
        h.orientation(&q).set_translation(t);

        let fast = h.homogenous_inverse();
        let general = h.inverse()?;
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(fast[(i, j)], general[(i, j)], epsilon = 1e-4);
            }
        }
        let id: FixedMat<4, 4> = h * fast;
        assert_relative_eq!(id.trace(), 4.0, epsilon = 1e-4);
    }
    Ok(())
}

#[test]
fn cholesky_solves_spd_system() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(31);
    for n in 1..6 {
        let b = random_matrix(&mut rng, n, n);
        // BᵀB + I is symmetric positive definite
        let mut a = Matrix::new(n, n);
        a.mul(&b.transposed(), &b)?;
        a.add(&Matrix::eye(n))?;

        let rhs: Vec<f32> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        let mut x = vec![0.0; n];
        a.cholesky_solve(&rhs, &mut x)?;
        let mut ax = vec![0.0; n];
        a.mul_vec(&x, &mut ax)?;
        for (l, r) in ax.iter().zip(&rhs) {
            assert_relative_eq!(l, r, epsilon = 1e-4);
        }
    }
    Ok(())
}

#[test]
fn nnls_solution_is_feasible_and_optimal() -> Result<(), LinalgError> {
    let mut rng = StdRng::seed_from_u64(37);
    for _ in 0..10 {
        let m = rng.random_range(3..7);
        let n = rng.random_range(1..=m);
        let a = random_matrix(&mut rng, m, n);
        let b: Vec<f32> = (0..m).map(|_| rng.random_range(-1.0..1.0)).collect();
        let sol = nnls::nnls(&a, &b)?;

        for j in 0..n {
            assert!(sol.x[j] >= 0.0);
            // complementary slackness
            if sol.x[j] > 0.0 {
                assert_relative_eq!(sol.w[j], 0.0, epsilon = 1e-3);
            } else {
                assert!(sol.w[j] <= 1e-3);
            }
        }
    }
    Ok(())
}

#[test]
fn ldp_satisfies_constraints() -> Result<(), LinalgError> {
    let g = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0])?;
    let h = [0.5, -1.0, 1.0];
    let sol = nnls::ldp(&g, &h)?;
    let mut gx = [0.0; 3];
    g.mul_vec(&sol.x, &mut gx)?;
    for (l, r) in gx.iter().zip(&h) {
        assert!(l + 1e-5 >= *r);
    }
    // closest point to the origin on x + y >= 1 with x >= 0.5
    assert_relative_eq!(sol.x[0], 0.5, epsilon = 1e-4);
    assert_relative_eq!(sol.x[1], 0.5, epsilon = 1e-4);
    Ok(())
}
