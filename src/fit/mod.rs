//! Curve training.
//!
//! - `fitter`: polynomial OLS on `√S` with fit diagnostics
//! - `trainer`: per-rating orchestration (parallel), quadratic or linear

pub mod fitter;
pub mod trainer;

pub use fitter::*;
pub use trainer::*;
