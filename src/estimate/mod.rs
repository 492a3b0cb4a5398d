//! Insulation outer diameter estimation.
//!
//! The primary entry point is [`estimate`], which evaluates the fitted curve for a
//! rating. [`strategy_for`] assembles the back-end chain selected on the command
//! line (see [`strategy`] for the individual back-ends).

pub mod strategy;

pub use strategy::*;

use crate::catalog::Catalog;
use crate::domain::{CableVoltageRating, DiameterEstimate, DiameterSource, EstimateMethod, round1};
use crate::error::EstimateError;
use crate::models::CurveModel;

/// Estimate the insulation OD (mm, one decimal) from the fitted curves.
///
/// Fails with [`EstimateError::UnknownVoltageClass`] when the rating has no curve.
pub fn estimate(
    curves: &CurveModel,
    rating: CableVoltageRating,
    cross_section_mm2: f64,
    reinforced: bool,
) -> Result<f64, EstimateError> {
    FittedCurveStrategy::new(curves)
        .estimate(rating, cross_section_mm2, reinforced)
        .map(|e| e.diameter_mm)
}

/// Insulation OD from a measured outer jacket diameter.
pub fn from_jacket_diameter(
    rating: CableVoltageRating,
    jacket_diameter_mm: f64,
) -> Result<DiameterEstimate, EstimateError> {
    let offset = rating.jacket_offset_mm();
    if !jacket_diameter_mm.is_finite() || jacket_diameter_mm <= offset {
        return Err(EstimateError::InvalidJacketDiameter {
            diameter: jacket_diameter_mm,
            offset,
        });
    }
    Ok(DiameterEstimate {
        diameter_mm: round1(jacket_diameter_mm - offset),
        source: DiameterSource::Jacket,
    })
}

/// Build the estimator chain for `method`.
///
/// - `Curve`: fitted curve, closed form for ratings without a curve
/// - `ClosedForm`: closed form only
/// - `Lookup`: reference cables (optionally by brand), then the `Curve` chain
///
/// Without a curve table, the curve-based methods degrade to the closed form.
pub fn strategy_for<'a>(
    method: EstimateMethod,
    catalog: &'a Catalog,
    curves: Option<&'a CurveModel>,
    brand: Option<&str>,
) -> Box<dyn EstimationStrategy + 'a> {
    let curve_chain = || -> Box<dyn EstimationStrategy + 'a> {
        match curves {
            Some(curves) => Box::new(Fallback::new(FittedCurveStrategy::new(curves), ClosedFormStrategy)),
            None => Box::new(ClosedFormStrategy),
        }
    };

    match method {
        EstimateMethod::ClosedForm => Box::new(ClosedFormStrategy),
        EstimateMethod::Curve => curve_chain(),
        EstimateMethod::Lookup => Box::new(DirectLookupStrategy::new(catalog, brand, curve_chain())),
    }
}
