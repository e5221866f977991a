#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Two-view geometry
//!
//! Robust estimation of the essential matrix (calibrated cameras) and the
//! fundamental matrix (uncalibrated cameras) from point correspondences,
//! followed by relative pose recovery for the essential matrix.
//!
//! ```rust
//! use glam::{DMat3, DQuat, DVec2, DVec3};
//! use twoview_geometry::camera::{CameraModel, SimplePinholeCamera};
//! use twoview_geometry::twoview::estimate_essential_matrix;
//! use twoview_ransac::RansacOptions;
//!
//! let camera = SimplePinholeCamera::new(800.0, 640.0, 480.0);
//! let rotation = DMat3::from_quat(DQuat::from_rotation_y(0.1));
//! let translation = DVec3::new(-1.0, 0.0, 0.1);
//!
//! let mut points1 = Vec::new();
//! let mut points2 = Vec::new();
//! for i in 0..50 {
//!     let t = i as f64;
//!     let p = DVec3::new((t * 0.37).sin() * 2.0, (t * 0.73).cos() * 1.5, 5.0 + (t * 0.11).sin());
//!     let q = rotation * p + translation;
//!     points1.push(camera.img_from_cam(DVec2::new(p.x / p.z, p.y / p.z)));
//!     points2.push(camera.img_from_cam(DVec2::new(q.x / q.z, q.y / q.z)));
//! }
//!
//! let report = estimate_essential_matrix(
//!     &points1,
//!     &points2,
//!     &camera,
//!     &camera,
//!     &RansacOptions::default(),
//! )?;
//! assert!(report.success);
//! assert_eq!(report.num_inliers, 50);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Camera models and coordinate normalization.
pub mod camera;

/// Minimal and non-minimal epipolar estimators.
pub mod estimators;

/// Linear algebra utilities.
pub mod linalg;

/// Polynomial root finding.
pub mod polynomial;

/// Relative pose recovery.
pub mod pose;

/// Robust two-view estimation entry points.
pub mod twoview;

pub use twoview::*;
pub use twoview_ransac::{RansacError, RansacOptions};
