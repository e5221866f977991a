use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use twoview_ransac::{Estimator, LoRansac, RansacError, RansacOptions};

/// Line `y = a * x + b` through two points.
struct LineTwoPointEstimator;

/// Least squares line through any number of points.
struct LineLeastSquaresEstimator;

fn line_residuals(x: &[f64], y: &[f64], model: &(f64, f64), residuals: &mut Vec<f64>) {
    residuals.clear();
    residuals.extend(x.iter().zip(y).map(|(&xi, &yi)| {
        let r = yi - (model.0 * xi + model.1);
        r * r
    }));
}

impl Estimator for LineTwoPointEstimator {
    type X = f64;
    type Y = f64;
    type Model = (f64, f64);

    const MIN_NUM_SAMPLES: usize = 2;

    fn estimate(&self, x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
        let dx = x[1] - x[0];
        if dx.abs() < 1e-12 {
            return Vec::new();
        }
        let a = (y[1] - y[0]) / dx;
        vec![(a, y[0] - a * x[0])]
    }

    fn residuals(&self, x: &[f64], y: &[f64], model: &(f64, f64), residuals: &mut Vec<f64>) {
        line_residuals(x, y, model, residuals);
    }
}

impl Estimator for LineLeastSquaresEstimator {
    type X = f64;
    type Y = f64;
    type Model = (f64, f64);

    const MIN_NUM_SAMPLES: usize = 2;

    fn estimate(&self, x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y) {
            sxy += (xi - mean_x) * (yi - mean_y);
            sxx += (xi - mean_x) * (xi - mean_x);
        }
        if sxx < 1e-12 {
            return Vec::new();
        }
        let a = sxy / sxx;
        vec![(a, mean_y - a * mean_x)]
    }

    fn residuals(&self, x: &[f64], y: &[f64], model: &(f64, f64), residuals: &mut Vec<f64>) {
        line_residuals(x, y, model, residuals);
    }
}

/// Least squares line that records the number of points of every call.
struct RecordingLeastSquaresEstimator {
    call_sizes: Rc<RefCell<Vec<usize>>>,
}

impl Estimator for RecordingLeastSquaresEstimator {
    type X = f64;
    type Y = f64;
    type Model = (f64, f64);

    const MIN_NUM_SAMPLES: usize = 2;

    fn estimate(&self, x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
        self.call_sizes.borrow_mut().push(x.len());
        LineLeastSquaresEstimator.estimate(x, y)
    }

    fn residuals(&self, x: &[f64], y: &[f64], model: &(f64, f64), residuals: &mut Vec<f64>) {
        line_residuals(x, y, model, residuals);
    }
}

/// 60 points on `y = 2x + 1` followed by 40 points far off the line.
fn line_data() -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..60 {
        let xi = i as f64 * 0.5;
        x.push(xi);
        y.push(2.0 * xi + 1.0);
    }
    for i in 0..40 {
        let xi = i as f64 * 0.7;
        x.push(xi);
        y.push(-3.0 * xi + 50.0 + (i % 7) as f64 * 10.0);
    }
    (x, y)
}

fn line_ransac(options: RansacOptions) -> LoRansac<LineTwoPointEstimator, LineLeastSquaresEstimator> {
    LoRansac::new(options, LineTwoPointEstimator, LineLeastSquaresEstimator)
}

#[test]
fn test_line_with_outliers() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let options = RansacOptions {
        max_error: 0.1,
        ..Default::default()
    };
    let report = line_ransac(options).estimate(&x, &y)?;

    assert!(report.success);
    let (a, b) = report.model.ok_or("missing model")?;
    assert_relative_eq!(a, 2.0, epsilon = 1e-9);
    assert_relative_eq!(b, 1.0, epsilon = 1e-9);

    assert!(report.support.num_inliers >= 60);
    assert_eq!(report.inlier_mask.len(), x.len());
    assert_eq!(
        report.inlier_mask.iter().filter(|&&m| m).count(),
        report.support.num_inliers
    );
    assert!(report.inlier_mask[..60].iter().all(|&m| m));
    assert!(report.num_trials >= 100);
    Ok(())
}

#[test]
fn test_fixed_seed_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let options = RansacOptions {
        max_error: 0.1,
        random_seed: Some(7),
        ..Default::default()
    };
    let ransac = line_ransac(options);
    let a = ransac.estimate(&x, &y)?;
    let b = ransac.estimate(&x, &y)?;
    assert_eq!(a.model, b.model);
    assert_eq!(a.inlier_mask, b.inlier_mask);
    assert_eq!(a.num_trials, b.num_trials);
    Ok(())
}

#[test]
fn test_estimate_with_rng() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let options = RansacOptions {
        max_error: 0.1,
        random_seed: None,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let report = line_ransac(options).estimate_with_rng(&x, &y, &mut rng)?;
    assert!(report.success);
    Ok(())
}

#[test]
fn test_min_inlier_ratio_not_reached() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let options = RansacOptions {
        max_error: 0.1,
        min_inlier_ratio: 0.9,
        ..Default::default()
    };
    let report = line_ransac(options).estimate(&x, &y)?;
    assert!(!report.success);
    assert!(report.model.is_none());
    assert_eq!(
        report.inlier_mask.iter().filter(|&&m| m).count(),
        report.support.num_inliers
    );
    Ok(())
}

#[test]
fn test_too_few_samples() -> Result<(), Box<dyn std::error::Error>> {
    let report = line_ransac(RansacOptions::default()).estimate(&[1.0], &[2.0])?;
    assert!(!report.success);
    assert!(report.model.is_none());
    assert_eq!(report.inlier_mask, vec![false]);
    assert_eq!(report.support.num_inliers, 0);
    assert_eq!(report.num_trials, 0);

    let report = line_ransac(RansacOptions::default()).estimate(&[], &[])?;
    assert!(!report.success);
    assert!(report.inlier_mask.is_empty());
    Ok(())
}

#[test]
fn test_degenerate_samples_yield_no_model() -> Result<(), Box<dyn std::error::Error>> {
    let x = vec![1.0; 20];
    let y = (0..20).map(|i| i as f64).collect::<Vec<_>>();
    let options = RansacOptions {
        max_num_trials: 200,
        ..Default::default()
    };
    let report = line_ransac(options).estimate(&x, &y)?;
    assert!(!report.success);
    assert!(report.model.is_none());
    assert_eq!(report.num_trials, 200);
    assert_eq!(report.support.num_inliers, 0);
    Ok(())
}

#[test]
fn test_mismatched_lengths() {
    let res = line_ransac(RansacOptions::default()).estimate(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
    assert_eq!(
        res.err(),
        Some(RansacError::MismatchedLengths {
            left_len: 3,
            right_len: 2,
        })
    );
}

#[test]
fn test_invalid_options() {
    let options = RansacOptions {
        max_error: 0.0,
        ..Default::default()
    };
    let res = line_ransac(options).estimate(&[1.0, 2.0], &[1.0, 2.0]);
    assert!(matches!(res, Err(RansacError::InvalidOptions(_))));
}

#[test]
fn test_all_inliers_stop_at_min_num_trials() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let (x, y) = (&x[..60], &y[..60]);
    let options = RansacOptions {
        max_error: 0.1,
        ..Default::default()
    };
    let report = line_ransac(options.clone()).estimate(x, y)?;
    assert!(report.success);
    assert_eq!(report.support.num_inliers, 60);
    assert_eq!(report.num_trials, options.min_num_trials);
    Ok(())
}

#[test]
fn test_adaptive_termination_before_max_num_trials() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let options = RansacOptions {
        max_error: 0.1,
        min_num_trials: 10,
        ..Default::default()
    };
    let report = line_ransac(options.clone()).estimate(&x, &y)?;
    assert!(report.success);
    assert!(report.num_trials >= options.min_num_trials);
    // 61 of 100 inliers need about 60 trials at the default confidence
    assert!(report.num_trials < 1000);
    assert!(report.num_trials < options.max_num_trials);
    Ok(())
}

#[test]
fn test_local_optimization_subsamples_inliers() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let call_sizes = Rc::new(RefCell::new(Vec::new()));
    let options = RansacOptions {
        max_error: 0.1,
        local_max_num_samples: 10,
        ..Default::default()
    };
    let ransac = LoRansac::new(
        options,
        LineTwoPointEstimator,
        RecordingLeastSquaresEstimator {
            call_sizes: Rc::clone(&call_sizes),
        },
    );
    let report = ransac.estimate(&x, &y)?;

    assert!(report.success);
    assert!(report.inlier_mask[..60].iter().all(|&m| m));
    let (a, b) = report.model.ok_or("missing model")?;
    assert_relative_eq!(a, 2.0, epsilon = 1e-9);
    assert_relative_eq!(b, 1.0, epsilon = 1e-9);

    let call_sizes = call_sizes.borrow();
    assert!(!call_sizes.is_empty());
    assert!(call_sizes.iter().all(|&n| (2..=10).contains(&n)));
    assert!(call_sizes.contains(&10));
    Ok(())
}

#[test]
fn test_local_optimization_disabled() -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = line_data();
    let call_sizes = Rc::new(RefCell::new(Vec::new()));
    let options = RansacOptions {
        max_error: 0.1,
        local_max_num_iterations: 0,
        ..Default::default()
    };
    let ransac = LoRansac::new(
        options,
        LineTwoPointEstimator,
        RecordingLeastSquaresEstimator {
            call_sizes: Rc::clone(&call_sizes),
        },
    );
    let report = ransac.estimate(&x, &y)?;
    assert!(report.success);
    assert!(call_sizes.borrow().is_empty());
    Ok(())
}
