//! # Relative pose
//!
//! Recovering the relative camera pose and 3D structure from an essential
//! matrix and its inlier correspondences.
//!
//! - [`decompose_essential_matrix`]: the four `(R, t)` candidates of an essential matrix
//! - [`check_cheirality`]: triangulation and depth test of a single candidate
//! - [`pose_from_essential_matrix`]: candidate selection by cheirality

mod essential;
pub use essential::*;

mod rigid;
pub use rigid::*;

mod triangulation;
pub use triangulation::*;
