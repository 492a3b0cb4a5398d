//! Estimation back-ends behind a single contract.
//!
//! Three ways of estimating the insulation outer diameter from the bitola have
//! been used over time. Each is a separate [`EstimationStrategy`] so they can be
//! composed and tested independently:
//!
//! - [`FittedCurveStrategy`]: per-rating polynomial in `√S` (primary)
//! - [`ClosedFormStrategy`]: compact-conductor geometry + nominal insulation walls
//! - [`DirectLookupStrategy`]: mean of matching reference cables, then a fallback
//!
//! All strategies apply the reinforced-insulation adjustment the same way and
//! round to one decimal.

use std::f64::consts::PI;

use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{CableVoltageRating, DiameterEstimate, DiameterSource, round1};
use crate::error::EstimateError;
use crate::models::CurveModel;

/// Conductor fill factor assumed for compact stranding.
pub const COMPACT_FILL_FACTOR: f64 = 0.90;

/// Common contract of every estimator back-end.
pub trait EstimationStrategy {
    /// Estimate the insulation outer diameter (mm, one decimal).
    ///
    /// `reinforced` is honored only for ratings with a reinforced override.
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError>;
}

impl<T: EstimationStrategy + ?Sized> EstimationStrategy for &T {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        (**self).estimate(rating, cross_section_mm2, reinforced)
    }
}

impl<T: EstimationStrategy + ?Sized> EstimationStrategy for Box<T> {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        (**self).estimate(rating, cross_section_mm2, reinforced)
    }
}

fn validate_section(cross_section_mm2: f64) -> Result<f64, EstimateError> {
    if cross_section_mm2.is_finite() && cross_section_mm2 > 0.0 {
        Ok(cross_section_mm2)
    } else {
        Err(EstimateError::InvalidCrossSection(cross_section_mm2))
    }
}

fn finish(raw: f64, rating: CableVoltageRating, reinforced: bool, source: DiameterSource) -> DiameterEstimate {
    DiameterEstimate {
        diameter_mm: round1(raw + rating.reinforced_adjustment_mm(reinforced)),
        source,
    }
}

/// `d_cond = √(4·S / (π·0.90))`, plus two nominal insulation walls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedFormStrategy;

impl ClosedFormStrategy {
    pub fn conductor_diameter_mm(cross_section_mm2: f64) -> f64 {
        (4.0 * cross_section_mm2 / (PI * COMPACT_FILL_FACTOR)).sqrt()
    }
}

impl EstimationStrategy for ClosedFormStrategy {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        let s = validate_section(cross_section_mm2)?;
        let raw = Self::conductor_diameter_mm(s) + 2.0 * rating.nominal_thickness_mm();
        Ok(finish(raw, rating, reinforced, DiameterSource::ClosedForm))
    }
}

/// Evaluates the fitted curve for the rating; fails for ratings without one.
#[derive(Debug, Clone, Copy)]
pub struct FittedCurveStrategy<'a> {
    curves: &'a CurveModel,
}

impl<'a> FittedCurveStrategy<'a> {
    pub fn new(curves: &'a CurveModel) -> Self {
        Self { curves }
    }
}

impl EstimationStrategy for FittedCurveStrategy<'_> {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        let s = validate_section(cross_section_mm2)?;
        let coeffs = self
            .curves
            .get(rating)
            .ok_or_else(|| EstimateError::UnknownVoltageClass(rating.label().to_string()))?;
        Ok(finish(coeffs.predict(s), rating, reinforced, DiameterSource::FittedCurve))
    }
}

/// Try `primary`; use `secondary` only when the primary has no data for the rating.
///
/// Input errors (e.g. a non-positive section) are returned as-is.
#[derive(Debug, Clone, Copy)]
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: EstimationStrategy, S: EstimationStrategy> EstimationStrategy for Fallback<P, S> {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        match self.primary.estimate(rating, cross_section_mm2, reinforced) {
            Err(EstimateError::UnknownVoltageClass(_)) => {
                debug!(%rating, "primary estimator has no data for rating, using fallback");
                self.secondary.estimate(rating, cross_section_mm2, reinforced)
            }
            other => other,
        }
    }
}

/// Average the measured insulation OD of reference cables with the same
/// rating and section (optionally the same brand) before falling back.
#[derive(Debug, Clone)]
pub struct DirectLookupStrategy<'a, F> {
    catalog: &'a Catalog,
    brand: Option<String>,
    fallback: F,
}

impl<'a, F> DirectLookupStrategy<'a, F> {
    pub fn new(catalog: &'a Catalog, brand: Option<&str>, fallback: F) -> Self {
        Self {
            catalog,
            brand: brand.map(str::trim).filter(|b| !b.is_empty()).map(str::to_string),
            fallback,
        }
    }
}

impl<F: EstimationStrategy> EstimationStrategy for DirectLookupStrategy<'_, F> {
    fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
    ) -> Result<DiameterEstimate, EstimateError> {
        let s = validate_section(cross_section_mm2)?;

        let (sum, n) = self
            .catalog
            .cable_records(rating, s, self.brand.as_deref())
            .fold((0.0, 0usize), |(sum, n), r| (sum + r.insulation_od_mm, n + 1));

        if n == 0 {
            debug!(%rating, section = s, brand = ?self.brand, "no reference cable, using fallback");
            return self.fallback.estimate(rating, s, reinforced);
        }

        Ok(finish(sum / n as f64, rating, reinforced, DiameterSource::DirectLookup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CableRecord;
    use crate::models::CurveCoefficients;
    use approx::assert_relative_eq;

    fn curves() -> CurveModel {
        [
            (CableVoltageRating::R15_25, CurveCoefficients::quadratic(0.0, 2.1, 6.0)),
            (CableVoltageRating::R20_35, CurveCoefficients::quadratic(0.01, 1.9, 14.0)),
        ]
        .into_iter()
        .collect()
    }

    fn record(rating: CableVoltageRating, s: f64, brand: &str, od: f64) -> CableRecord {
        CableRecord {
            rating,
            cross_section_mm2: s,
            brand: Some(brand.to_string()),
            cable_name: None,
            insulation_od_mm: od,
            conductor_diameter_mm: None,
            insulation_thickness_mm: None,
        }
    }

    #[test]
    fn fitted_curve_worked_example() {
        let curves = curves();
        let est = FittedCurveStrategy::new(&curves)
            .estimate(CableVoltageRating::R15_25, 95.0, false)
            .unwrap();
        assert_eq!(est.diameter_mm, 26.5);
        assert_eq!(est.source, DiameterSource::FittedCurve);
    }

    #[test]
    fn fitted_curve_unknown_rating_is_an_error() {
        let curves = curves();
        let err = FittedCurveStrategy::new(&curves)
            .estimate(CableVoltageRating::R12_20, 95.0, false)
            .unwrap_err();
        assert_eq!(err, EstimateError::UnknownVoltageClass("12/20".to_string()));
    }

    #[test]
    fn closed_form_matches_geometry() {
        let est = ClosedFormStrategy
            .estimate(CableVoltageRating::R8_7_15, 50.0, false)
            .unwrap();
        // sqrt(200 / (π·0.9)) = 8.41…, + 2·3.0
        assert_eq!(est.diameter_mm, 14.4);
    }

    #[test]
    fn non_positive_section_rejected_by_every_strategy() {
        let curves = curves();
        for s in [0.0, -10.0, f64::NAN] {
            assert!(ClosedFormStrategy.estimate(CableVoltageRating::R15_25, s, false).is_err());
            assert!(
                FittedCurveStrategy::new(&curves)
                    .estimate(CableVoltageRating::R15_25, s, false)
                    .is_err()
            );
        }
    }

    #[test]
    fn reinforced_shift_is_identical_across_strategies() {
        let curves = curves();
        let no_curves = CurveModel::new();
        let catalog = Catalog::from_parts(
            vec![
                record(CableVoltageRating::R20_35, 95.0, "Prysmian", 29.0),
                record(CableVoltageRating::R20_35, 95.0, "Nexans", 30.0),
                record(CableVoltageRating::R20_35, 240.0, "Nexans", 36.2),
                record(CableVoltageRating::R15_25, 95.0, "Nexans", 26.4),
            ],
            Vec::new(),
            Vec::new(),
        );
        let strategies: Vec<Box<dyn EstimationStrategy + '_>> = vec![
            Box::new(ClosedFormStrategy),
            Box::new(FittedCurveStrategy::new(&curves)),
            Box::new(Fallback::new(FittedCurveStrategy::new(&curves), ClosedFormStrategy)),
            Box::new(Fallback::new(FittedCurveStrategy::new(&no_curves), ClosedFormStrategy)),
            Box::new(DirectLookupStrategy::new(&catalog, None, ClosedFormStrategy)),
        ];
        for strategy in &strategies {
            for s in [35.0, 95.0, 240.0, 630.0] {
                let plain = strategy.estimate(CableVoltageRating::R20_35, s, false).unwrap();
                let reinf = strategy.estimate(CableVoltageRating::R20_35, s, true).unwrap();
                assert_relative_eq!(reinf.diameter_mm - plain.diameter_mm, 2.6, epsilon = 1e-9);
                assert_eq!(reinf.source, plain.source);

                // No override for 15/25: flag is ignored.
                let a = strategy.estimate(CableVoltageRating::R15_25, s, true).unwrap();
                let b = strategy.estimate(CableVoltageRating::R15_25, s, false).unwrap();
                assert_eq!(a, b);
            }
        }

        let lookup = DirectLookupStrategy::new(&catalog, None, ClosedFormStrategy);
        let est = lookup.estimate(CableVoltageRating::R20_35, 95.0, true).unwrap();
        assert_eq!(est.source, DiameterSource::DirectLookup);
        assert_eq!(est.diameter_mm, 32.1);
    }

    #[test]
    fn estimates_have_one_decimal() {
        let curves = curves();
        let strategy = Fallback::new(FittedCurveStrategy::new(&curves), ClosedFormStrategy);
        for rating in CableVoltageRating::ALL {
            for s in [10.0, 16.0, 25.0, 70.0, 120.0, 185.0, 300.0, 500.0] {
                let d = strategy.estimate(rating, s, false).unwrap().diameter_mm;
                assert_relative_eq!(d * 10.0, (d * 10.0).round(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn fallback_covers_missing_curves_only() {
        let curves = curves();
        let strategy = Fallback::new(FittedCurveStrategy::new(&curves), ClosedFormStrategy);

        let est = strategy.estimate(CableVoltageRating::R12_20, 95.0, false).unwrap();
        assert_eq!(est.source, DiameterSource::ClosedForm);

        let est = strategy.estimate(CableVoltageRating::R15_25, 95.0, false).unwrap();
        assert_eq!(est.source, DiameterSource::FittedCurve);

        assert_eq!(
            strategy.estimate(CableVoltageRating::R12_20, -1.0, false),
            Err(EstimateError::InvalidCrossSection(-1.0))
        );
    }

    #[test]
    fn direct_lookup_averages_matching_records() {
        let catalog = Catalog::from_parts(
            vec![
                record(CableVoltageRating::R15_25, 95.0, "Prysmian", 26.0),
                record(CableVoltageRating::R15_25, 95.0, "Nexans", 27.0),
                record(CableVoltageRating::R15_25, 120.0, "Nexans", 28.4),
            ],
            Vec::new(),
            Vec::new(),
        );

        let strategy = DirectLookupStrategy::new(&catalog, None, ClosedFormStrategy);
        let est = strategy.estimate(CableVoltageRating::R15_25, 95.0, false).unwrap();
        assert_eq!(est.diameter_mm, 26.5);
        assert_eq!(est.source, DiameterSource::DirectLookup);

        let branded = DirectLookupStrategy::new(&catalog, Some("nexans"), ClosedFormStrategy);
        assert_eq!(
            branded.estimate(CableVoltageRating::R15_25, 95.0, false).unwrap().diameter_mm,
            27.0
        );

        // Unlisted section falls through to the closed form.
        let est = strategy.estimate(CableVoltageRating::R15_25, 50.0, false).unwrap();
        assert_eq!(est.source, DiameterSource::ClosedForm);
    }
}
