//! Curve model consumed by the diameter estimator.

pub mod curve;

pub use curve::*;
