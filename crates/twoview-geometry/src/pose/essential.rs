use glam::{DMat3, DVec2, DVec3};
use serde::Serialize;

use super::check_cheirality;
use crate::linalg::svd3;

/// Relative pose recovered from an essential matrix.
#[derive(Clone, Debug, Serialize)]
pub struct PoseFromEssential {
    /// Rotation from the first to the second camera.
    pub rotation: DMat3,
    /// Unit translation from the first to the second camera.
    pub translation: DVec3,
    /// Triangulated points in the first camera frame that passed the
    /// cheirality test.
    pub points3d: Vec<DVec3>,
}

/// Decompose an essential matrix into its two rotations and the translation
/// direction, `E ~ [t]x * R`.
///
/// The four pose candidates are `(R1, t)`, `(R2, t)`, `(R1, -t)` and
/// `(R2, -t)`.
pub fn decompose_essential_matrix(e: &DMat3) -> (DMat3, DMat3, DVec3) {
    let svd = svd3(e);
    let mut u = svd.u;
    let mut v = svd.v;

    if u.determinant() < 0.0 {
        u.z_axis = -u.z_axis;
    }
    if v.determinant() < 0.0 {
        v.z_axis = -v.z_axis;
    }

    let w = DMat3::from_cols(
        DVec3::new(0.0, -1.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    );

    let r1 = u * w * v.transpose();
    let r2 = u * w.transpose() * v.transpose();
    let t = u.z_axis.normalize_or_zero();

    (r1, r2, t)
}

/// Recover the relative pose from an essential matrix and the correspondences
/// it explains, in normalized camera coordinates.
///
/// Every candidate of [`decompose_essential_matrix`] is scored by the number
/// of points triangulated in front of both cameras and the best one wins. When
/// no candidate yields any valid point, the first candidate is returned with an
/// empty point set.
pub fn pose_from_essential_matrix(
    e: &DMat3,
    points1: &[DVec2],
    points2: &[DVec2],
) -> PoseFromEssential {
    let (r1, r2, t) = decompose_essential_matrix(e);
    let candidates = [(r1, t), (r2, t), (r1, -t), (r2, -t)];

    let mut best = PoseFromEssential {
        rotation: r1,
        translation: t,
        points3d: Vec::new(),
    };

    for (r, t) in candidates {
        let points3d = check_cheirality(&r, &t, points1, points2);
        if points3d.len() > best.points3d.len() {
            best = PoseFromEssential {
                rotation: r,
                translation: t,
                points3d,
            };
        }
    }

    log::debug!(
        "Pose from essential matrix: {} / {} points in front of both cameras",
        best.points3d.len(),
        points1.len()
    );

    best
}
