//! Generic range containment with a symmetric tolerance band.
//!
//! A row matches when its group predicate holds and
//!
//! ```text
//! min − tol ≤ target ≤ max + tol
//! ```
//!
//! Matches keep the table order. Each match records whether the target also
//! lies inside the *nominal* range; rows admitted only by the tolerance band
//! must be confirmed by a person before ordering.

use serde::Serialize;

use crate::domain::{ConnectorRow, TerminationRow};
use crate::error::MatchError;

/// A catalog row with a closed `[min, max]` range.
pub trait RangeRow {
    fn range_min(&self) -> f64;
    fn range_max(&self) -> f64;

    /// `min ≤ value ≤ max`, ignoring any tolerance.
    fn contains(&self, value: f64) -> bool {
        self.range_min() <= value && value <= self.range_max()
    }
}

impl RangeRow for TerminationRow {
    fn range_min(&self) -> f64 {
        self.range_min
    }

    fn range_max(&self) -> f64 {
        self.range_max
    }
}

impl RangeRow for ConnectorRow {
    fn range_min(&self) -> f64 {
        self.range_min
    }

    fn range_max(&self) -> f64 {
        self.range_max
    }
}

/// How a row came to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitStatus {
    /// Target inside the nominal range.
    Nominal,
    /// Target only inside the tolerance-widened range.
    ToleranceOnly,
}

impl FitStatus {
    pub fn from_nominal(nominal_fit: bool) -> Self {
        if nominal_fit { FitStatus::Nominal } else { FitStatus::ToleranceOnly }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FitStatus::Nominal => "nominal",
            FitStatus::ToleranceOnly => "tolerance only - confirm",
        }
    }
}

/// A matched row (borrowed from the catalog).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMatch<'a, R> {
    pub row: &'a R,
    pub nominal_fit: bool,
}

impl<R> RangeMatch<'_, R> {
    pub fn status(&self) -> FitStatus {
        FitStatus::from_nominal(self.nominal_fit)
    }
}

/// Filter `rows` to the group and the (tolerance-widened) range, in table order.
///
/// Zero matches is a normal outcome.
pub fn match_ranges<'a, R: RangeRow>(
    rows: &'a [R],
    in_group: impl Fn(&R) -> bool,
    target: f64,
    tolerance: f64,
) -> Result<Vec<RangeMatch<'a, R>>, MatchError> {
    if !(target.is_finite() && target >= 0.0) {
        return Err(MatchError::InvalidTarget(target));
    }
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(MatchError::InvalidTolerance(tolerance));
    }

    Ok(rows
        .iter()
        .filter(|row| in_group(*row))
        .filter(|row| row.range_min() - tolerance <= target && target <= row.range_max() + tolerance)
        .map(|row| RangeMatch {
            row,
            nominal_fit: row.contains(target),
        })
        .collect())
}
