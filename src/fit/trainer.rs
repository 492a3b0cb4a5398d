//! Offline training of the per-rating diameter curves.
//!
//! For every rating present in the reference cable table:
//! 1. collect `(√S, OD)` pairs
//! 2. fit a quadratic when there are at least `min_samples` cables,
//!    otherwise a straight line (stored with `a2 = 0` and no R²)
//! 3. skip the rating when even a line is underdetermined
//!
//! Ratings are fitted in parallel; the report keeps rating order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{CableRecord, CableVoltageRating};
use crate::error::FitError;
use crate::fit::fitter::fit_polynomial;
use crate::models::{CurveCoefficients, CurveModel};

/// Cables needed per rating before a quadratic is attempted.
pub const DEFAULT_MIN_SAMPLES: usize = 8;

/// Diagnostics for one fitted rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingFit {
    pub rating: CableVoltageRating,
    pub samples: usize,
    pub coefficients: CurveCoefficients,
    pub rmse: f64,
}

impl RatingFit {
    pub fn degree(&self) -> usize {
        if self.coefficients.is_linear() { 1 } else { 2 }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainingReport {
    pub model: CurveModel,
    pub fits: Vec<RatingFit>,
    /// Ratings with data that could not be fitted, with the reason.
    pub skipped: Vec<(CableVoltageRating, String)>,
}

/// Fit one curve per rating from the reference cables.
pub fn train_curves(records: &[CableRecord], min_samples: usize) -> TrainingReport {
    let mut groups: BTreeMap<CableVoltageRating, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let (x, y) = groups.entry(record.rating).or_default();
        x.push(record.cross_section_mm2.sqrt());
        y.push(record.insulation_od_mm);
    }

    let groups: Vec<_> = groups.into_iter().collect();
    let results: Vec<(CableVoltageRating, Result<RatingFit, FitError>)> = groups
        .par_iter()
        .map(|(rating, (x, y))| (*rating, fit_rating(*rating, x, y, min_samples)))
        .collect();

    let mut report = TrainingReport::default();
    for (rating, result) in results {
        match result {
            Ok(fit) => {
                info!(
                    rating = rating.label(),
                    samples = fit.samples,
                    degree = fit.degree(),
                    rmse = fit.rmse,
                    "fitted diameter curve"
                );
                report.model.insert(rating, fit.coefficients);
                report.fits.push(fit);
            }
            Err(e) => {
                warn!(rating = rating.label(), "skipping rating: {e}");
                report.skipped.push((rating, e.to_string()));
            }
        }
    }
    report
}

fn fit_rating(
    rating: CableVoltageRating,
    x: &[f64],
    y: &[f64],
    min_samples: usize,
) -> Result<RatingFit, FitError> {
    let samples = x.len();
    let quadratic = if samples >= min_samples.max(3) {
        fit_polynomial(x, y, 2).ok()
    } else {
        None
    };

    let (coefficients, rmse) = match quadratic {
        Some(fit) => (
            CurveCoefficients::quadratic(fit.coeffs[0], fit.coeffs[1], fit.coeffs[2]).with_r2(fit.r2),
            fit.rmse,
        ),
        None => {
            let line = fit_polynomial(x, y, 1)?;
            (CurveCoefficients::quadratic(0.0, line.coeffs[0], line.coeffs[1]), line.rmse)
        }
    };

    Ok(RatingFit {
        rating,
        samples,
        coefficients,
        rmse,
    })
}
