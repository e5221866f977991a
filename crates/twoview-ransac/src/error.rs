/// Errors returned by the RANSAC engine before any sampling takes place.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RansacError {
    /// The two correspondence sequences have different lengths.
    #[error("Mismatched correspondence lengths: {left_len} != {right_len}")]
    MismatchedLengths {
        /// Length of the first sequence.
        left_len: usize,
        /// Length of the second sequence.
        right_len: usize,
    },

    /// The options violate one of their invariants.
    #[error("Invalid RANSAC options: {0}")]
    InvalidOptions(String),
}
