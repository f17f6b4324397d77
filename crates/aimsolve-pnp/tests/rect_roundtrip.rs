use aimsolve_pnp::so3::SO3;
use aimsolve_pnp::{
    CameraIntrinsics, CameraModel, PnPError, PolynomialDistortion, RectPnPSolver, TargetSize,
};
use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn project_corners(
    camera: &CameraModel,
    size: TargetSize,
    rvec: DVec3,
    t: DVec3,
) -> [[f64; 2]; 4] {
    let r = SO3::exp(rvec).matrix();
    size.model_points().map(|p| {
        camera
            .project(r * DVec3::from_array(p) + t)
            .expect("target in front of the camera")
    })
}

fn check_roundtrip(camera: CameraModel, seed: u64) -> Result<(), PnPError> {
    let size = TargetSize::new(135.0, 55.0);
    let mut solver = RectPnPSolver::new(camera.clone());
    solver.set_target_size(size.width, size.height);

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..50 {
        // targets roughly facing the camera at working distance
        let rvec = DVec3::new(
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.6..0.6),
            rng.random_range(-0.3..0.3),
        );
        let t = DVec3::new(
            rng.random_range(-300.0..300.0),
            rng.random_range(-200.0..200.0),
            rng.random_range(800.0..4000.0),
        );
        let corners = project_corners(&camera, size, rvec, t);
        let pose = solver.solve(&corners)?;

        let r_gt = SO3::exp(rvec).matrix();
        let r_est = aimsolve_pnp::so3::mat3_from_rows(&pose.rotation);
        assert!(
            (r_est - r_gt).abs_diff_eq(glam::DMat3::ZERO, 1e-3),
            "rotation mismatch for rvec {rvec:?}"
        );
        let t_est = DVec3::from_array(pose.translation);
        assert!(
            (t_est - t).length() < 1e-3 * t.length(),
            "translation mismatch: {t_est:?} vs {t:?}"
        );
    }
    Ok(())
}

#[test]
fn rect_roundtrip_pinhole() -> Result<(), PnPError> {
    let camera = CameraModel::pinhole(CameraIntrinsics::new(1280.0, 1280.0, 640.0, 512.0));
    check_roundtrip(camera, 7)
}

#[test]
fn rect_roundtrip_distorted() -> Result<(), PnPError> {
    let camera = CameraModel::with_distortion(
        CameraIntrinsics::new(1100.0, 1105.0, 630.0, 500.0),
        PolynomialDistortion::radial_tangential(-0.12, 0.08, 1e-3, -8e-4),
    );
    check_roundtrip(camera, 42)
}

#[test]
fn rect_fronto_parallel_distance() -> Result<(), PnPError> {
    let camera = CameraModel::pinhole(CameraIntrinsics::new(1000.0, 1000.0, 320.0, 240.0));
    let size = TargetSize::new(230.0, 55.0);
    let corners = project_corners(&camera, size, DVec3::ZERO, DVec3::new(0.0, 0.0, 2500.0));

    let mut solver = RectPnPSolver::new(camera);
    solver.set_target_size(size.width, size.height);
    let pose = solver.solve(&corners)?;

    approx::assert_relative_eq!(pose.translation[0], 0.0, epsilon = 1e-6);
    approx::assert_relative_eq!(pose.translation[1], 0.0, epsilon = 1e-6);
    approx::assert_relative_eq!(pose.translation[2], 2500.0, epsilon = 1e-6);
    approx::assert_relative_eq!(pose.rotation[0][0], 1.0, epsilon = 1e-9);
    approx::assert_relative_eq!(pose.rotation[1][1], 1.0, epsilon = 1e-9);
    approx::assert_relative_eq!(pose.rotation[2][2], 1.0, epsilon = 1e-9);
    Ok(())
}
