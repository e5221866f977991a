//! # Minimal and non-minimal epipolar estimators
//!
//! - [`EssentialMatrixFivePointEstimator`]: essential matrix from 5 or more
//!   correspondences in normalized camera coordinates.
//! - [`FundamentalMatrixSevenPointEstimator`]: fundamental matrix from exactly 7
//!   pixel correspondences, up to 3 solutions.
//! - [`FundamentalMatrixEightPointEstimator`]: least squares fundamental matrix
//!   from 8 or more pixel correspondences.
//!
//! All of them plug into [`twoview_ransac::LoRansac`] and score models with the
//! squared [`sampson_error`].

use glam::{DMat3, DVec2};

mod essential;
pub use essential::*;

mod fundamental;
pub use fundamental::*;

/// Squared Sampson distance of the correspondence `x1 <-> x2` to the epipolar
/// geometry `m`, where `x2^T m x1 = 0` holds for a perfect match.
///
/// Returns `+inf` when the epipolar lines vanish but the constraint is not met.
pub fn sampson_error(m: &DMat3, x1: &DVec2, x2: &DVec2) -> f64 {
    let x1h = x1.extend(1.0);
    let x2h = x2.extend(1.0);

    let mx1 = *m * x1h;
    let mtx2 = m.transpose() * x2h;

    let num = x2h.dot(mx1);
    let denom = mx1.x * mx1.x + mx1.y * mx1.y + mtx2.x * mtx2.x + mtx2.y * mtx2.y;

    if denom == 0.0 {
        return if num == 0.0 { 0.0 } else { f64::INFINITY };
    }
    num * num / denom
}

/// Squared Sampson errors of all correspondences, written into `residuals`.
pub(crate) fn sampson_residuals(
    m: &DMat3,
    x1: &[DVec2],
    x2: &[DVec2],
    residuals: &mut Vec<f64>,
) {
    residuals.clear();
    residuals.extend(x1.iter().zip(x2).map(|(p1, p2)| sampson_error(m, p1, p2)));
}
