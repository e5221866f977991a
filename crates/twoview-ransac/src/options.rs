use serde::{Deserialize, Serialize};

use crate::RansacError;

/// Parameters for locally optimized RANSAC.
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete set of options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacOptions {
    /// Inlier threshold on the (non squared) residual distance.
    pub max_error: f64,
    /// Minimum ratio of inliers for the estimate to be declared successful.
    pub min_inlier_ratio: f64,
    /// Minimum number of trials, even if the adaptive estimate is lower.
    pub min_num_trials: usize,
    /// Maximum number of trials.
    pub max_num_trials: usize,
    /// Desired probability that at least one sample set is outlier-free.
    pub confidence: f64,
    /// Safety factor applied to the adaptive number of trials.
    pub dyn_num_trials_multiplier: f64,
    /// Maximum number of inliers handed to the local estimator.
    pub local_max_num_samples: usize,
    /// Maximum number of iterated local optimization rounds per new best model.
    pub local_max_num_iterations: usize,
    /// Optional fixed seed for reproducible sampling.
    pub random_seed: Option<u64>,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_error: 4.0,
            min_inlier_ratio: 0.25,
            min_num_trials: 100,
            max_num_trials: 10000,
            confidence: 0.9999,
            dyn_num_trials_multiplier: 3.0,
            local_max_num_samples: 256,
            local_max_num_iterations: 10,
            random_seed: Some(0),
        }
    }
}

impl RansacOptions {
    /// Assemble options from the five scalar parameters, keeping defaults for the rest.
    pub fn from_params(
        max_error: f64,
        min_inlier_ratio: f64,
        min_num_trials: usize,
        max_num_trials: usize,
        confidence: f64,
    ) -> Self {
        Self {
            max_error,
            min_inlier_ratio,
            min_num_trials,
            max_num_trials,
            confidence,
            ..Default::default()
        }
    }

    /// Validate the option invariants.
    pub fn check(&self) -> Result<(), RansacError> {
        if !(self.max_error > 0.0) {
            return Err(RansacError::InvalidOptions(format!(
                "max_error must be positive, got {}",
                self.max_error
            )));
        }
        if !(0.0..=1.0).contains(&self.min_inlier_ratio) {
            return Err(RansacError::InvalidOptions(format!(
                "min_inlier_ratio must be in [0, 1], got {}",
                self.min_inlier_ratio
            )));
        }
        if self.min_num_trials > self.max_num_trials {
            return Err(RansacError::InvalidOptions(format!(
                "min_num_trials ({}) > max_num_trials ({})",
                self.min_num_trials, self.max_num_trials
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(RansacError::InvalidOptions(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        if !(self.dyn_num_trials_multiplier > 0.0) {
            return Err(RansacError::InvalidOptions(format!(
                "dyn_num_trials_multiplier must be positive, got {}",
                self.dyn_num_trials_multiplier
            )));
        }
        Ok(())
    }
}
