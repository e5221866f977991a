use glam::{DMat3, DVec2, DVec3};
use twoview_ransac::Estimator;

use super::sampson_residuals;
use crate::linalg::{
    adjugate, epipolar_design_matrix, mat3_from_row_major, normalize_frobenius,
    normalize_points_2d, right_null_space, svd3, trace,
};
use crate::polynomial::solve_cubic;

/// Fundamental matrix from 7 correspondences.
///
/// The two-dimensional null space of the normalized design matrix is
/// intersected with the rank-2 constraint `det(F) = 0`, which yields one or
/// three real solutions.
#[derive(Clone, Copy, Debug, Default)]
pub struct FundamentalMatrixSevenPointEstimator;

/// Least squares fundamental matrix from 8 or more correspondences, with the
/// rank-2 constraint enforced afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct FundamentalMatrixEightPointEstimator;

/// Normalize both point sets, `None` when either of them is degenerate.
fn normalize_pair(x1: &[DVec2], x2: &[DVec2]) -> Option<(Vec<DVec2>, DMat3, Vec<DVec2>, DMat3)> {
    let (x1n, t1) = normalize_points_2d(x1)?;
    let (x2n, t2) = normalize_points_2d(x2)?;
    Some((x1n, t1, x2n, t2))
}

/// Undo the point normalization, `F = T2^T * Fn * T1`.
fn denormalize(f: &DMat3, t1: &DMat3, t2: &DMat3) -> Option<DMat3> {
    normalize_frobenius(&(t2.transpose() * *f * *t1))
}

/// Closest rank-2 matrix in the Frobenius norm.
fn enforce_rank2(f: &DMat3) -> DMat3 {
    let svd = svd3(f);
    let s = DVec3::new(svd.s.x, svd.s.y, 0.0);
    svd.u * DMat3::from_diagonal(s) * svd.v.transpose()
}

impl FundamentalMatrixSevenPointEstimator {
    /// Estimate all fundamental matrices consistent with 7 correspondences.
    pub fn estimate_fundamental(x1: &[DVec2], x2: &[DVec2]) -> Vec<DMat3> {
        if x1.len() != x2.len() || x1.len() < Self::MIN_NUM_SAMPLES {
            return Vec::new();
        }
        let Some((x1n, t1, x2n, t2)) = normalize_pair(x1, x2) else {
            return Vec::new();
        };

        let a = epipolar_design_matrix(&x1n, &x2n);
        let null = right_null_space(&a, 2);
        let f1 = mat3_from_row_major(&null[0]);
        let f2 = mat3_from_row_major(&null[1]);

        // det(f2 + lambda * d) = c0 + c1 * lambda + c2 * lambda^2 + c3 * lambda^3
        let d = f1 - f2;
        let c0 = f2.determinant();
        let c1 = trace(&(adjugate(&f2) * d));
        let c2 = trace(&(f2 * adjugate(&d)));
        let c3 = d.determinant();

        solve_cubic(c3, c2, c1, c0)
            .into_iter()
            .filter(|lambda| lambda.is_finite())
            .filter_map(|lambda| denormalize(&(f2 + d * lambda), &t1, &t2))
            .collect()
    }
}

impl FundamentalMatrixEightPointEstimator {
    /// Estimate the fundamental matrix from 8 or more correspondences.
    pub fn estimate_fundamental(x1: &[DVec2], x2: &[DVec2]) -> Option<DMat3> {
        if x1.len() != x2.len() || x1.len() < Self::MIN_NUM_SAMPLES {
            return None;
        }
        let (x1n, t1, x2n, t2) = normalize_pair(x1, x2)?;

        let a = epipolar_design_matrix(&x1n, &x2n);
        let null = right_null_space(&a, 1);
        let f = enforce_rank2(&mat3_from_row_major(&null[0]));

        denormalize(&f, &t1, &t2)
    }
}

impl Estimator for FundamentalMatrixSevenPointEstimator {
    type X = DVec2;
    type Y = DVec2;
    type Model = DMat3;

    const MIN_NUM_SAMPLES: usize = 7;

    fn estimate(&self, x: &[DVec2], y: &[DVec2]) -> Vec<DMat3> {
        Self::estimate_fundamental(x, y)
    }

    fn residuals(&self, x: &[DVec2], y: &[DVec2], model: &DMat3, residuals: &mut Vec<f64>) {
        sampson_residuals(model, x, y, residuals);
    }
}

impl Estimator for FundamentalMatrixEightPointEstimator {
    type X = DVec2;
    type Y = DVec2;
    type Model = DMat3;

    const MIN_NUM_SAMPLES: usize = 8;

    fn estimate(&self, x: &[DVec2], y: &[DVec2]) -> Vec<DMat3> {
        Self::estimate_fundamental(x, y).into_iter().collect()
    }

    fn residuals(&self, x: &[DVec2], y: &[DVec2], model: &DMat3, residuals: &mut Vec<f64>) {
        sampson_residuals(model, x, y, residuals);
    }
}
