use argh::FromArgs;
use glam::{DQuat, DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use twoview_geometry::camera::{CameraModel, PinholeCamera};
use twoview_geometry::{estimate_essential_matrix, estimate_fundamental_matrix, RansacOptions};

#[derive(FromArgs)]
/// Estimate two-view geometry on a synthetic scene with outliers
struct Args {
    /// number of correspondences explained by the true pose
    #[argh(option, default = "200")]
    num_inliers: usize,

    /// number of random correspondences
    #[argh(option, default = "100")]
    num_outliers: usize,

    /// uniform pixel noise added to the inliers
    #[argh(option, default = "0.5")]
    noise: f64,

    /// seed of the scene generator
    #[argh(option, default = "0")]
    seed: u64,

    /// optional path to a JSON file with the RANSAC options
    #[argh(option)]
    options_path: Option<PathBuf>,

    /// print the full reports as JSON
    #[argh(switch)]
    json: bool,
}

struct Scene {
    points1: Vec<DVec2>,
    points2: Vec<DVec2>,
    rotation: DQuat,
    translation: DVec3,
}

fn generate_scene(camera: &PinholeCamera, args: &Args) -> Scene {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let rotation = DQuat::from_scaled_axis(DVec3::new(0.05, -0.15, 0.02));
    let translation = DVec3::new(-1.0, 0.1, 0.25);
    let width = 2.0 * camera.cx;
    let height = 2.0 * camera.cy;

    let mut points1 = Vec::with_capacity(args.num_inliers + args.num_outliers);
    let mut points2 = Vec::with_capacity(args.num_inliers + args.num_outliers);

    for _ in 0..args.num_inliers {
        let p = DVec3::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-1.5..1.5),
            rng.random_range(4.0..10.0),
        );
        let q = rotation * p + translation;
        let mut noise = || {
            if args.noise > 0.0 {
                DVec2::new(
                    rng.random_range(-args.noise..args.noise),
                    rng.random_range(-args.noise..args.noise),
                )
            } else {
                DVec2::ZERO
            }
        };
        let n1 = noise();
        let n2 = noise();
        points1.push(camera.img_from_cam(DVec2::new(p.x / p.z, p.y / p.z)) + n1);
        points2.push(camera.img_from_cam(DVec2::new(q.x / q.z, q.y / q.z)) + n2);
    }

    for _ in 0..args.num_outliers {
        points1.push(DVec2::new(
            rng.random_range(0.0..width),
            rng.random_range(0.0..height),
        ));
        points2.push(DVec2::new(
            rng.random_range(0.0..width),
            rng.random_range(0.0..height),
        ));
    }

    Scene {
        points1,
        points2,
        rotation,
        translation: translation.normalize(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let options = match &args.options_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RansacOptions::default(),
    };
    log::info!("RANSAC options: {:?}", options);

    let camera = PinholeCamera::new(800.0, 800.0, 640.0, 480.0);
    let scene = generate_scene(&camera, &args);
    println!(
        "Scene: #{} inliers, #{} outliers, noise {} px",
        args.num_inliers, args.num_outliers, args.noise
    );

    let essential = estimate_essential_matrix(
        &scene.points1,
        &scene.points2,
        &camera,
        &camera,
        &options,
    )?;
    println!(
        "Essential matrix: success {}, #{} inliers after {} trials",
        essential.success, essential.num_inliers, essential.num_trials
    );
    if let Some(pose) = &essential.cam2_from_cam1 {
        let rotation_error = pose.rotation.angle_between(scene.rotation).to_degrees();
        let translation_error = pose
            .translation
            .dot(scene.translation)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        println!(
            "Relative pose: rotation error {:.4} deg, translation error {:.4} deg, #{} points",
            rotation_error,
            translation_error,
            essential.points3d.len()
        );

        let center2 = pose.inverse().translation;
        let max_depth2 = essential
            .points3d
            .iter()
            .map(|p| pose.transform_point(*p).z)
            .fold(0.0, f64::max);
        println!(
            "Second camera center: [{:.4}, {:.4}, {:.4}], max depth in second view {:.2}",
            center2.x, center2.y, center2.z, max_depth2
        );
    }

    let fundamental = estimate_fundamental_matrix(&scene.points1, &scene.points2, &options)?;
    println!(
        "Fundamental matrix: success {}, #{} inliers after {} trials",
        fundamental.success, fundamental.num_inliers, fundamental.num_trials
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&essential)?);
        println!("{}", serde_json::to_string_pretty(&fundamental)?);
    }

    Ok(())
}
