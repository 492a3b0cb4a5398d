//! Part selection by range matching.
//!
//! - terminations: grouped by voltage class, range is insulation OD (mm)
//! - connectors: grouped by attachment type (and material for compression
//!   lugs), range is conductor section (mm²)

pub mod range;

pub use range::*;

use serde::Serialize;

use crate::domain::{ConnectorKind, ConnectorRow, TerminationRow, VoltageClass};
use crate::error::MatchError;

/// A compatible termination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminationMatch {
    pub part_number: String,
    pub range_min: f64,
    pub range_max: f64,
    pub nominal_fit: bool,
}

impl TerminationMatch {
    pub fn status(&self) -> FitStatus {
        FitStatus::from_nominal(self.nominal_fit)
    }
}

/// A compatible lug/connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorMatch {
    pub code: String,
    pub range_min: f64,
    pub range_max: f64,
    pub material: Option<String>,
    pub nominal_fit: bool,
}

impl ConnectorMatch {
    pub fn status(&self) -> FitStatus {
        FitStatus::from_nominal(self.nominal_fit)
    }
}

/// Terminations of `class` whose OD range covers `diameter_mm` (± `tolerance_mm`).
pub fn match_terminations(
    rows: &[TerminationRow],
    class: VoltageClass,
    diameter_mm: f64,
    tolerance_mm: f64,
) -> Result<Vec<TerminationMatch>, MatchError> {
    let matches = match_ranges(rows, |r| r.voltage_class == class, diameter_mm, tolerance_mm)?;
    Ok(matches
        .into_iter()
        .map(|m| TerminationMatch {
            part_number: m.row.part_number.clone(),
            range_min: m.row.range_min,
            range_max: m.row.range_max,
            nominal_fit: m.nominal_fit,
        })
        .collect())
}

/// Connector grouping: attachment type plus an optional material.
///
/// The material only narrows compression lugs; shear-bolt connectors ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorFilter<'a> {
    pub kind: ConnectorKind,
    pub material: Option<&'a str>,
}

impl ConnectorFilter<'_> {
    pub fn accepts(&self, row: &ConnectorRow) -> bool {
        if row.kind != self.kind {
            return false;
        }
        match (self.kind, self.material.map(str::trim).filter(|m| !m.is_empty())) {
            (ConnectorKind::Compression, Some(wanted)) => row
                .material
                .as_deref()
                .is_some_and(|m| m.trim().eq_ignore_ascii_case(wanted)),
            _ => true,
        }
    }
}

/// Connectors accepted by `filter` whose section range covers `cross_section_mm2`.
pub fn match_connectors(
    rows: &[ConnectorRow],
    filter: &ConnectorFilter<'_>,
    cross_section_mm2: f64,
    tolerance_mm2: f64,
) -> Result<Vec<ConnectorMatch>, MatchError> {
    let matches = match_ranges(rows, |r| filter.accepts(r), cross_section_mm2, tolerance_mm2)?;
    Ok(matches
        .into_iter()
        .map(|m| ConnectorMatch {
            code: m.row.code.clone(),
            range_min: m.row.range_min,
            range_max: m.row.range_max,
            material: m.row.material.clone(),
            nominal_fit: m.nominal_fit,
        })
        .collect())
}
