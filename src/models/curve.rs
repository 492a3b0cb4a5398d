//! Insulation-diameter curves keyed by cable rating.
//!
//! Each rating carries a quadratic in `x = √S`:
//!
//! ```text
//! OD(S) = a2·x² + a1·x + a0
//! ```
//!
//! A linear fit (too few training cables) is stored as `a2 = 0` with no R².
//! The model is built once at startup and never mutated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::CableVoltageRating;
use crate::math::horner;

/// Fitted coefficients for one rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveCoefficients {
    pub a2: f64,
    pub a1: f64,
    pub a0: f64,
    /// Coefficient of determination on the training data (absent for linear fallbacks).
    pub r2: Option<f64>,
}

impl CurveCoefficients {
    pub fn quadratic(a2: f64, a1: f64, a0: f64) -> Self {
        Self { a2, a1, a0, r2: None }
    }

    pub fn with_r2(mut self, r2: Option<f64>) -> Self {
        self.r2 = r2;
        self
    }

    /// Raw (unrounded) insulation diameter for a section in mm².
    pub fn predict(&self, cross_section_mm2: f64) -> f64 {
        horner(&[self.a2, self.a1, self.a0], cross_section_mm2.sqrt())
    }

    pub fn is_linear(&self) -> bool {
        self.a2 == 0.0
    }
}

/// All curves available to the estimator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurveModel {
    curves: BTreeMap<CableVoltageRating, CurveCoefficients>,
}

impl CurveModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a curve, returning the previous one for that rating (if any).
    pub fn insert(
        &mut self,
        rating: CableVoltageRating,
        coeffs: CurveCoefficients,
    ) -> Option<CurveCoefficients> {
        self.curves.insert(rating, coeffs)
    }

    pub fn get(&self, rating: CableVoltageRating) -> Option<&CurveCoefficients> {
        self.curves.get(&rating)
    }

    /// Curves ordered by rating.
    pub fn iter(&self) -> impl Iterator<Item = (CableVoltageRating, &CurveCoefficients)> {
        self.curves.iter().map(|(r, c)| (*r, c))
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl FromIterator<(CableVoltageRating, CurveCoefficients)> for CurveModel {
    fn from_iter<I: IntoIterator<Item = (CableVoltageRating, CurveCoefficients)>>(iter: I) -> Self {
        Self {
            curves: iter.into_iter().collect(),
        }
    }
}
