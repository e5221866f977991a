use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DMat3, DQuat, DVec2, DVec3};
use twoview_geometry::camera::{normalize_points, CameraModel, PinholeCamera};
use twoview_geometry::estimators::{
    sampson_error, EssentialMatrixFivePointEstimator, FundamentalMatrixEightPointEstimator,
    FundamentalMatrixSevenPointEstimator,
};
use twoview_geometry::linalg::skew;
use twoview_geometry::pose::{decompose_essential_matrix, pose_from_essential_matrix};
use twoview_geometry::{estimate_essential_matrix, estimate_fundamental_matrix, RansacOptions};

const CAMERA: PinholeCamera = PinholeCamera {
    fx: 800.0,
    fy: 800.0,
    cx: 640.0,
    cy: 480.0,
};

/// Generate pixel correspondences of a synthetic scene, every fourth one an outlier.
fn generate_data(n: usize) -> (Vec<DVec2>, Vec<DVec2>) {
    let r = DMat3::from_quat(DQuat::from_scaled_axis(DVec3::new(0.03, -0.1, 0.02)));
    let t = DVec3::new(-1.0, 0.1, 0.15);
    let mut x1 = Vec::with_capacity(n);
    let mut x2 = Vec::with_capacity(n);
    for i in 0..n {
        let fi = i as f64;
        let p = DVec3::new(
            (fi * 0.713).sin() * 2.0,
            (fi * 1.117).cos() * 1.5,
            5.0 + (fi * 0.291).sin() * 2.0,
        );
        let q = r * p + t;
        x1.push(CAMERA.img_from_cam(DVec2::new(p.x / p.z, p.y / p.z)));
        if i % 4 == 3 {
            x2.push(DVec2::new((fi * 37.0) % 1280.0, (fi * 53.0) % 960.0));
        } else {
            x2.push(CAMERA.img_from_cam(DVec2::new(q.x / q.z, q.y / q.z)));
        }
    }
    (x1, x2)
}

fn bench_minimal_solvers(c: &mut Criterion) {
    let (x1, x2) = generate_data(8);
    let (n1, n2) = (normalize_points(&CAMERA, &x1), normalize_points(&CAMERA, &x2));

    c.bench_function("essential_five_point", |b| {
        b.iter(|| {
            std::hint::black_box(EssentialMatrixFivePointEstimator::estimate_essential(
                &n1[..5],
                &n2[..5],
            ));
        });
    });
    c.bench_function("fundamental_seven_point", |b| {
        b.iter(|| {
            std::hint::black_box(FundamentalMatrixSevenPointEstimator::estimate_fundamental(
                &x1[..7],
                &x2[..7],
            ));
        });
    });
}

fn bench_fundamental_8point(c: &mut Criterion) {
    let mut group = c.benchmark_group("fundamental_eight_point");
    for &n in &[8, 50, 200] {
        let (x1, x2) = generate_data(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                std::hint::black_box(FundamentalMatrixEightPointEstimator::estimate_fundamental(
                    &x1, &x2,
                ));
            });
        });
    }
    group.finish();
}

fn bench_sampson_error(c: &mut Criterion) {
    let (x1, x2) = generate_data(1);
    let f = DMat3::from_cols(
        DVec3::new(0.0, -0.001, 0.01),
        DVec3::new(0.0015, 0.0, -0.02),
        DVec3::new(-0.01, 0.02, 1.0),
    );
    c.bench_function("sampson_error", |b| {
        b.iter(|| {
            std::hint::black_box(sampson_error(&f, &x1[0], &x2[0]));
        });
    });
}

fn bench_pose_from_essential(c: &mut Criterion) {
    let r = DMat3::from_quat(DQuat::from_scaled_axis(DVec3::new(0.03, -0.1, 0.02)));
    let t = DVec3::new(-1.0, 0.1, 0.15).normalize();
    let e = skew(&t) * r;
    let (x1, x2) = generate_data(100);
    let (n1, n2) = (normalize_points(&CAMERA, &x1), normalize_points(&CAMERA, &x2));

    c.bench_function("decompose_essential_matrix", |b| {
        b.iter(|| {
            std::hint::black_box(decompose_essential_matrix(&e));
        });
    });
    c.bench_function("pose_from_essential_matrix", |b| {
        b.iter(|| {
            std::hint::black_box(pose_from_essential_matrix(&e, &n1, &n2));
        });
    });
}

fn bench_estimate_essential(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_essential_matrix");
    for &n in &[50, 200, 500] {
        let (x1, x2) = generate_data(n);
        let options = RansacOptions {
            random_seed: Some(42),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let _ = std::hint::black_box(estimate_essential_matrix(
                    &x1, &x2, &CAMERA, &CAMERA, &options,
                ));
            });
        });
    }
    group.finish();
}

fn bench_estimate_fundamental(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_fundamental_matrix");
    for &n in &[50, 200, 500] {
        let (x1, x2) = generate_data(n);
        let options = RansacOptions {
            random_seed: Some(42),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let _ = std::hint::black_box(estimate_fundamental_matrix(&x1, &x2, &options));
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_minimal_solvers,
    bench_fundamental_8point,
    bench_sampson_error,
    bench_pose_from_essential,
    bench_estimate_essential,
    bench_estimate_fundamental,
);
criterion_main!(benches);
