/// A model estimator usable by [`crate::LoRansac`], either in the minimal
/// (hypothesis generation) or in the non-minimal (local refinement) role.
///
/// Both roles of one engine must agree on the correspondence types and on the
/// model type, and should compute the same residual.
pub trait Estimator {
    /// Correspondence type in the first view.
    type X;
    /// Correspondence type in the second view.
    type Y;
    /// Estimated model.
    type Model: Clone;

    /// Number of correspondences needed to estimate a model.
    const MIN_NUM_SAMPLES: usize;

    /// Estimate zero or more candidate models from `x.len() >= MIN_NUM_SAMPLES`
    /// correspondences.
    ///
    /// Degenerate configurations yield an empty vector.
    fn estimate(&self, x: &[Self::X], y: &[Self::Y]) -> Vec<Self::Model>;

    /// Squared residual of every correspondence under `model`.
    ///
    /// `residuals` is cleared and refilled with `x.len()` entries.
    fn residuals(
        &self,
        x: &[Self::X],
        y: &[Self::Y],
        model: &Self::Model,
        residuals: &mut Vec<f64>,
    );
}
