use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rokin_linalg::{Matrix, Matrix4x4, Quaternion, Vector3, Workspace};

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    let data = (0..rows * cols).map(|_| rng.random_range(-1.0..1.0)).collect();
    Matrix::from_vec(rows, cols, data).unwrap()
}

fn bench_pseudo_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("pseudo_inverse");
    let mut rng = StdRng::seed_from_u64(0);

    for n in [2, 3, 6, 7] {
        let j = random_matrix(&mut rng, 3, n);
        let mut pinv = Matrix::new(n, 3);
        let mut ws = Workspace::new();

        group.bench_with_input(BenchmarkId::new("alloc", n), &n, |b, _| {
            b.iter(|| black_box(j.pseudo_inverse(&mut pinv).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("workspace", n), &n, |b, _| {
            b.iter(|| black_box(j.pseudo_inverse_in(&mut pinv, &mut ws).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("damped", n), &n, |b, _| {
            b.iter(|| {
                j.damped_least_squares_in(0.01, &mut pinv, &mut ws).unwrap();
                black_box(&pinv);
            })
        });
    }
    group.finish();
}

fn bench_transform_chain(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let links: Vec<Matrix4x4> = (0..7)
        .map(|_| {
            let q = Quaternion::from_axis_angle(Vector3::Z, rng.random_range(-3.0..3.0)).unwrap();
            let mut h = Matrix4x4::eye();
            h.orientation(&q).set_translation(Vector3::new(1.0, 0.0, 0.2));
            h
        })
        .collect();

    c.bench_function("transform_chain_7", |b| {
        b.iter(|| {
            let h = links.iter().fold(Matrix4x4::eye(), |acc, t| acc * *t);
            black_box(h.get_translation())
        })
    });
}

criterion_group!(benches, bench_pseudo_inverse, bench_transform_chain);
criterion_main!(benches);
