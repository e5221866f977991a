#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::RansacError;

mod estimator;
pub use estimator::Estimator;

mod loransac;
pub use loransac::*;

mod options;
pub use options::RansacOptions;

mod support;
pub use support::Support;
