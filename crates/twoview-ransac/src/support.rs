/// Support of a model over the full correspondence set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Support {
    /// Number of correspondences with a residual below the threshold.
    pub num_inliers: usize,
    /// Sum of the residuals of the inliers (lower is better).
    pub residual_sum: f64,
}

impl Default for Support {
    fn default() -> Self {
        Self {
            num_inliers: 0,
            residual_sum: f64::MAX,
        }
    }
}

impl Support {
    /// Measure the support of a model from its squared residuals.
    ///
    /// A residual is an inlier when it does not exceed `max_residual`, and the
    /// resulting mask is written into `inlier_mask`.
    pub fn evaluate(residuals: &[f64], max_residual: f64, inlier_mask: &mut Vec<bool>) -> Self {
        inlier_mask.clear();
        let mut support = Self {
            num_inliers: 0,
            residual_sum: 0.0,
        };
        for &r in residuals {
            let is_inlier = r <= max_residual;
            if is_inlier {
                support.num_inliers += 1;
                support.residual_sum += r;
            }
            inlier_mask.push(is_inlier);
        }
        support
    }

    /// More inliers wins, ties are broken by the lower residual sum.
    pub fn is_better_than(&self, other: &Support) -> bool {
        if self.num_inliers != other.num_inliers {
            return self.num_inliers > other.num_inliers;
        }
        self.residual_sum < other.residual_sum
    }
}
