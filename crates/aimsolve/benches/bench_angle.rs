use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use aimsolve::{AngleSolver, AngleSolverFactory, RotatedRect, TargetType};
use aimsolve_pnp::{CameraIntrinsics, CameraModel, PolynomialDistortion};

fn bench_get_angle(c: &mut Criterion) {
    let mut group = c.benchmark_group("GetAngle");

    let cameras = [
        (
            "pinhole",
            CameraModel::pinhole(CameraIntrinsics::new(1280.0, 1280.0, 640.0, 512.0)),
        ),
        (
            "distorted",
            CameraModel::with_distortion(
                CameraIntrinsics::new(1280.0, 1280.0, 640.0, 512.0),
                PolynomialDistortion::radial_tangential(-0.1, 0.02, 1e-4, -1e-4),
            ),
        ),
    ];

    for (name, camera) in cameras {
        let mut factory = AngleSolverFactory::with_solver(AngleSolver::new(camera));
        factory.set_target_size(135.0, 55.0, TargetType::SmallArmor);
        let rect = RotatedRect::new([700.0, 480.0], 90.0, 38.0, 7.5);

        group.bench_with_input(BenchmarkId::new("small_armor", name), &rect, |b, rect| {
            b.iter(|| {
                factory
                    .get_angle(black_box(rect), TargetType::SmallArmor, 15.0, 0.0, [0.0, 0.0])
                    .expect("solve")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get_angle);
criterion_main!(benches);
