use glam::{DMat3, DVec2, DVec3};
use serde::Serialize;
use twoview_ransac::{LoRansac, RansacError, RansacOptions};

use crate::camera::{normalize_points, normalized_max_error, CameraModel};
use crate::estimators::{
    EssentialMatrixFivePointEstimator, FundamentalMatrixEightPointEstimator,
    FundamentalMatrixSevenPointEstimator,
};
use crate::pose::{pose_from_essential_matrix, Rigid3};

/// Errors returned by the two-view estimation entry points.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TwoViewError {
    /// The correspondence arrays have different lengths.
    #[error("Mismatched array lengths: {left_name} has {left_len}, {right_name} has {right_len}")]
    MismatchedArrayLengths {
        /// Name of the first array.
        left_name: &'static str,
        /// Length of the first array.
        left_len: usize,
        /// Name of the second array.
        right_name: &'static str,
        /// Length of the second array.
        right_len: usize,
    },

    /// The robust estimator rejected its input.
    #[error(transparent)]
    Ransac(#[from] RansacError),
}

/// Result of [`estimate_essential_matrix`].
///
/// `inliers` is aligned with the input correspondences and `num_inliers`
/// counts its `true` entries, whether or not the estimation succeeded.
#[derive(Clone, Debug, Serialize)]
pub struct EssentialMatrixReport {
    /// Whether a model with enough support was found.
    pub success: bool,
    /// Essential matrix with unit Frobenius norm.
    pub e: Option<DMat3>,
    /// Relative pose of the second camera, unit translation.
    pub cam2_from_cam1: Option<Rigid3>,
    /// Inliers triangulated in front of both cameras, in the first camera frame.
    ///
    /// Inliers failing the cheirality test are dropped, so the entries are in
    /// inlier order but not aligned with the `true` entries of `inliers`.
    pub points3d: Vec<DVec3>,
    /// Number of inliers.
    pub num_inliers: usize,
    /// Per-correspondence inlier mask.
    pub inliers: Vec<bool>,
    /// Number of RANSAC trials performed.
    pub num_trials: usize,
}

/// Result of [`estimate_fundamental_matrix`].
#[derive(Clone, Debug, Serialize)]
pub struct FundamentalMatrixReport {
    /// Whether a model with enough support was found.
    pub success: bool,
    /// Rank-2 fundamental matrix with unit Frobenius norm.
    pub f: Option<DMat3>,
    /// Number of inliers.
    pub num_inliers: usize,
    /// Per-correspondence inlier mask.
    pub inliers: Vec<bool>,
    /// Number of RANSAC trials performed.
    pub num_trials: usize,
}

fn check_lengths(points1: &[DVec2], points2: &[DVec2]) -> Result<(), TwoViewError> {
    if points1.len() != points2.len() {
        return Err(TwoViewError::MismatchedArrayLengths {
            left_name: "points1",
            left_len: points1.len(),
            right_name: "points2",
            right_len: points2.len(),
        });
    }
    Ok(())
}

/// Robustly estimate the essential matrix between two calibrated views and
/// recover the relative pose from its inliers.
///
/// `points1` and `points2` are matching pixel coordinates; `options.max_error`
/// is given in pixels and converted to normalized coordinates with the mean
/// focal length of both cameras.
///
/// # Errors
///
/// Fails when the arrays have different lengths or the options are invalid.
/// Not finding a model is reported with `success == false`.
pub fn estimate_essential_matrix<C1, C2>(
    points1: &[DVec2],
    points2: &[DVec2],
    camera1: &C1,
    camera2: &C2,
    options: &RansacOptions,
) -> Result<EssentialMatrixReport, TwoViewError>
where
    C1: CameraModel + ?Sized,
    C2: CameraModel + ?Sized,
{
    check_lengths(points1, points2)?;
    options.check()?;

    let points1_normalized = normalize_points(camera1, points1);
    let points2_normalized = normalize_points(camera2, points2);

    let mut ransac_options = options.clone();
    ransac_options.max_error = normalized_max_error(options.max_error, camera1, camera2);

    log::debug!(
        "Estimating essential matrix from {} correspondences, max error {} px ({} normalized)",
        points1.len(),
        options.max_error,
        ransac_options.max_error
    );

    let ransac = LoRansac::new(
        ransac_options,
        EssentialMatrixFivePointEstimator,
        EssentialMatrixFivePointEstimator,
    );
    let report = ransac.estimate(&points1_normalized, &points2_normalized)?;

    let (e, cam2_from_cam1, points3d) = match report.model {
        Some(e) if report.success => {
            let (inliers1, inliers2): (Vec<DVec2>, Vec<DVec2>) = points1_normalized
                .iter()
                .zip(&points2_normalized)
                .zip(&report.inlier_mask)
                .filter_map(|(pair, &is_inlier)| is_inlier.then_some(pair))
                .unzip();
            let pose = pose_from_essential_matrix(&e, &inliers1, &inliers2);
            let cam2_from_cam1 = Rigid3::from_rotation_matrix(&pose.rotation, pose.translation);
            (Some(e), Some(cam2_from_cam1), pose.points3d)
        }
        _ => (None, None, Vec::new()),
    };

    Ok(EssentialMatrixReport {
        success: report.success,
        e,
        cam2_from_cam1,
        points3d,
        num_inliers: report.support.num_inliers,
        inliers: report.inlier_mask,
        num_trials: report.num_trials,
    })
}

/// Same as [`estimate_essential_matrix`] with the common options given
/// explicitly and everything else at its default.
#[allow(clippy::too_many_arguments)]
pub fn estimate_essential_matrix_from_params<C1, C2>(
    points1: &[DVec2],
    points2: &[DVec2],
    camera1: &C1,
    camera2: &C2,
    max_error_px: f64,
    min_inlier_ratio: f64,
    min_num_trials: usize,
    max_num_trials: usize,
    confidence: f64,
) -> Result<EssentialMatrixReport, TwoViewError>
where
    C1: CameraModel + ?Sized,
    C2: CameraModel + ?Sized,
{
    let options = RansacOptions::from_params(
        max_error_px,
        min_inlier_ratio,
        min_num_trials,
        max_num_trials,
        confidence,
    );
    estimate_essential_matrix(points1, points2, camera1, camera2, &options)
}

/// Robustly estimate the fundamental matrix between two uncalibrated views.
///
/// Hypotheses come from the 7-point solver and are refined with the 8-point
/// solver on their inliers. `options.max_error` is given in pixels.
///
/// # Errors
///
/// Fails when the arrays have different lengths or the options are invalid.
/// Not finding a model is reported with `success == false`.
pub fn estimate_fundamental_matrix(
    points1: &[DVec2],
    points2: &[DVec2],
    options: &RansacOptions,
) -> Result<FundamentalMatrixReport, TwoViewError> {
    check_lengths(points1, points2)?;

    log::debug!(
        "Estimating fundamental matrix from {} correspondences, max error {} px",
        points1.len(),
        options.max_error
    );

    let ransac = LoRansac::new(
        options.clone(),
        FundamentalMatrixSevenPointEstimator,
        FundamentalMatrixEightPointEstimator,
    );
    let report = ransac.estimate(points1, points2)?;

    Ok(FundamentalMatrixReport {
        success: report.success,
        f: report.model,
        num_inliers: report.support.num_inliers,
        inliers: report.inlier_mask,
        num_trials: report.num_trials,
    })
}

/// Same as [`estimate_fundamental_matrix`] with the common options given
/// explicitly and everything else at its default.
pub fn estimate_fundamental_matrix_from_params(
    points1: &[DVec2],
    points2: &[DVec2],
    max_error_px: f64,
    min_inlier_ratio: f64,
    min_num_trials: usize,
    max_num_trials: usize,
    confidence: f64,
) -> Result<FundamentalMatrixReport, TwoViewError> {
    let options = RansacOptions::from_params(
        max_error_px,
        min_inlier_ratio,
        min_num_trials,
        max_num_trials,
        confidence,
    );
    estimate_fundamental_matrix(points1, points2, &options)
}
