use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Estimator, RansacError, RansacOptions, Support};

/// Result of a RANSAC estimation.
///
/// `inlier_mask` is always aligned with the input correspondences and
/// `support.num_inliers` always equals the number of `true` entries, also when
/// the estimation failed. On failure `model` is `None` and the support
/// describes the best hypothesis seen, if any.
#[derive(Clone, Debug)]
pub struct RansacReport<M> {
    /// Whether a model with enough support was found.
    pub success: bool,
    /// Best model, only present on success.
    pub model: Option<M>,
    /// Support of the best model.
    pub support: Support,
    /// Per-correspondence inlier mask.
    pub inlier_mask: Vec<bool>,
    /// Number of sampling trials performed.
    pub num_trials: usize,
}

impl<M> RansacReport<M> {
    fn failure(num_samples: usize) -> Self {
        Self {
            success: false,
            model: None,
            support: Support {
                num_inliers: 0,
                residual_sum: 0.0,
            },
            inlier_mask: vec![false; num_samples],
            num_trials: 0,
        }
    }
}

struct BestHypothesis<M> {
    model: Option<M>,
    support: Support,
    inlier_mask: Vec<bool>,
}

/// Locally optimized RANSAC.
///
/// Hypotheses are generated by the minimal estimator `E`; every time a new best
/// hypothesis is found it is refined by the non-minimal estimator `L` on its
/// inliers.
#[derive(Clone, Debug)]
pub struct LoRansac<E, L> {
    options: RansacOptions,
    estimator: E,
    local_estimator: L,
}

impl<E, L> LoRansac<E, L>
where
    E: Estimator,
    E::X: Clone,
    E::Y: Clone,
    L: Estimator<X = E::X, Y = E::Y, Model = E::Model>,
{
    /// Create a new engine from its options and estimator pair.
    pub fn new(options: RansacOptions, estimator: E, local_estimator: L) -> Self {
        Self {
            options,
            estimator,
            local_estimator,
        }
    }

    /// The options the engine runs with.
    pub fn options(&self) -> &RansacOptions {
        &self.options
    }

    /// Robustly estimate a model from the correspondences `x[i] <-> y[i]`.
    ///
    /// The sampler is seeded from [`RansacOptions::random_seed`], so two calls
    /// with the same inputs and a fixed seed return identical reports.
    pub fn estimate(
        &self,
        x: &[E::X],
        y: &[E::Y],
    ) -> Result<RansacReport<E::Model>, RansacError> {
        let mut rng = match self.options.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut tr = rand::rng();
                StdRng::from_rng(&mut tr)
            }
        };
        self.estimate_with_rng(x, y, &mut rng)
    }

    /// Same as [`LoRansac::estimate`] but draws samples from the given generator.
    pub fn estimate_with_rng<R: Rng + ?Sized>(
        &self,
        x: &[E::X],
        y: &[E::Y],
        rng: &mut R,
    ) -> Result<RansacReport<E::Model>, RansacError> {
        if x.len() != y.len() {
            return Err(RansacError::MismatchedLengths {
                left_len: x.len(),
                right_len: y.len(),
            });
        }
        self.options.check()?;

        let num_samples = x.len();
        if num_samples < E::MIN_NUM_SAMPLES {
            log::debug!(
                "Not enough correspondences: {} < {}",
                num_samples,
                E::MIN_NUM_SAMPLES
            );
            return Ok(RansacReport::failure(num_samples));
        }

        let max_residual = self.options.max_error * self.options.max_error;

        let mut best = BestHypothesis {
            model: None,
            support: Support::default(),
            inlier_mask: vec![false; num_samples],
        };

        let mut residuals = Vec::with_capacity(num_samples);
        let mut mask = Vec::with_capacity(num_samples);
        let mut x_sample = Vec::with_capacity(E::MIN_NUM_SAMPLES);
        let mut y_sample = Vec::with_capacity(E::MIN_NUM_SAMPLES);

        let mut dyn_max_num_trials = self.options.max_num_trials;
        let mut num_trials = 0;

        for trial in 0..self.options.max_num_trials {
            if trial >= dyn_max_num_trials && trial >= self.options.min_num_trials {
                break;
            }
            num_trials += 1;

            x_sample.clear();
            y_sample.clear();
            for idx in rand::seq::index::sample(rng, num_samples, E::MIN_NUM_SAMPLES) {
                x_sample.push(x[idx].clone());
                y_sample.push(y[idx].clone());
            }

            for model in self.estimator.estimate(&x_sample, &y_sample) {
                self.estimator.residuals(x, y, &model, &mut residuals);
                let support = Support::evaluate(&residuals, max_residual, &mut mask);

                if !support.is_better_than(&best.support) {
                    continue;
                }

                log::trace!(
                    "Trial {}: new best with {} inliers",
                    trial,
                    support.num_inliers
                );
                best.support = support;
                best.model = Some(model);
                std::mem::swap(&mut best.inlier_mask, &mut mask);

                self.local_optimization(x, y, rng, max_residual, &mut best);

                dyn_max_num_trials = compute_num_trials(
                    best.support.num_inliers,
                    num_samples,
                    E::MIN_NUM_SAMPLES,
                    self.options.confidence,
                    self.options.dyn_num_trials_multiplier,
                );
            }
        }

        let success = best.model.is_some()
            && best.support.num_inliers >= E::MIN_NUM_SAMPLES
            && best.support.num_inliers as f64
                >= self.options.min_inlier_ratio * num_samples as f64;

        log::debug!(
            "LO-RANSAC finished after {} trials: {} / {} inliers, success: {}",
            num_trials,
            best.support.num_inliers,
            num_samples,
            success
        );

        if best.model.is_none() {
            let mut report = RansacReport::failure(num_samples);
            report.num_trials = num_trials;
            return Ok(report);
        }

        Ok(RansacReport {
            success,
            model: if success { best.model } else { None },
            support: best.support,
            inlier_mask: best.inlier_mask,
            num_trials,
        })
    }

    /// Iteratively re-estimate the best model from its inliers with the local
    /// estimator, as long as the inlier set keeps growing.
    fn local_optimization<R: Rng + ?Sized>(
        &self,
        x: &[E::X],
        y: &[E::Y],
        rng: &mut R,
        max_residual: f64,
        best: &mut BestHypothesis<E::Model>,
    ) {
        let max_local_samples = self.options.local_max_num_samples.max(L::MIN_NUM_SAMPLES);

        let mut residuals = Vec::with_capacity(x.len());
        let mut mask = Vec::with_capacity(x.len());
        let mut x_inlier = Vec::new();
        let mut y_inlier = Vec::new();

        for _ in 0..self.options.local_max_num_iterations {
            let inlier_indices = best
                .inlier_mask
                .iter()
                .enumerate()
                .filter_map(|(i, &is_inlier)| is_inlier.then_some(i))
                .collect::<Vec<_>>();

            if inlier_indices.len() < L::MIN_NUM_SAMPLES {
                return;
            }

            x_inlier.clear();
            y_inlier.clear();
            if inlier_indices.len() > max_local_samples {
                let subset = rand::seq::index::sample(rng, inlier_indices.len(), max_local_samples);
                for k in subset {
                    x_inlier.push(x[inlier_indices[k]].clone());
                    y_inlier.push(y[inlier_indices[k]].clone());
                }
            } else {
                for &idx in &inlier_indices {
                    x_inlier.push(x[idx].clone());
                    y_inlier.push(y[idx].clone());
                }
            }

            let prev_num_inliers = best.support.num_inliers;

            for model in self.local_estimator.estimate(&x_inlier, &y_inlier) {
                self.local_estimator
                    .residuals(x, y, &model, &mut residuals);
                let support = Support::evaluate(&residuals, max_residual, &mut mask);

                // keep the refined model unless it is strictly worse
                if !best.support.is_better_than(&support) {
                    best.support = support;
                    best.model = Some(model);
                    std::mem::swap(&mut best.inlier_mask, &mut mask);
                }
            }

            if best.support.num_inliers <= prev_num_inliers {
                return;
            }
        }
    }
}

/// Number of trials needed to sample at least one outlier-free minimal set
/// with probability `confidence`, given the current inlier ratio.
///
/// The estimate is multiplied by `multiplier` and saturates at `usize::MAX`.
pub fn compute_num_trials(
    num_inliers: usize,
    num_samples: usize,
    sample_size: usize,
    confidence: f64,
    multiplier: f64,
) -> usize {
    if num_samples == 0 {
        return usize::MAX;
    }

    let inlier_ratio = num_inliers as f64 / num_samples as f64;

    let nom = 1.0 - confidence;
    if nom <= 0.0 {
        return usize::MAX;
    }

    let denom = 1.0 - inlier_ratio.powi(sample_size as i32);
    if denom <= 0.0 {
        return 1;
    }
    if denom >= 1.0 {
        return usize::MAX;
    }

    // float to int casts saturate
    (nom.ln() / denom.ln() * multiplier).ceil() as usize
}
