use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rokin_kinematics::{DHKinematics, IkParams, JointConfig};
use rokin_linalg::Vector3;

fn planar_arm(dof: usize) -> DHKinematics {
    let link = 2.0 / dof as f32;
    DHKinematics::with_params(
        IkParams::new().with_tolerance(1e-4).with_max_iterations(100),
        vec![JointConfig::revolute(link); dof],
    )
    .unwrap()
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");
    for dof in [2, 3, 6, 7] {
        let mut arm = planar_arm(dof);
        let state: Vec<f32> = (0..dof).map(|i| 0.1 * i as f32).collect();
        group.bench_with_input(BenchmarkId::from_parameter(dof), &dof, |b, _| {
            b.iter(|| black_box(arm.forward_from(&state).unwrap()))
        });
    }
    group.finish();
}

fn bench_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("inverse");
    for dof in [2, 3, 6, 7] {
        let mut arm = planar_arm(dof);
        let seed: Vec<f32> = (0..dof).map(|_| 0.3).collect();
        group.bench_with_input(BenchmarkId::from_parameter(dof), &dof, |b, _| {
            b.iter(|| {
                arm.set_params(&seed).unwrap();
                arm.set_target(Vector3::new(1.0, 1.0, 0.0));
                black_box(arm.inverse().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_inverse);
criterion_main!(benches);
