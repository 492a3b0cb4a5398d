//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - validated once when the reference tables are loaded
//! - passed around by reference during estimation and matching
//! - exported to JSON/CSV alongside the selection results

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::EstimateError;

/// Termination tier as printed in the part catalog (`15 kV`, `25 kV`, `35 kV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VoltageClass {
    #[serde(rename = "15 kV")]
    Kv15,
    #[serde(rename = "25 kV")]
    Kv25,
    #[serde(rename = "35 kV")]
    Kv35,
}

impl VoltageClass {
    pub const ALL: [VoltageClass; 3] = [VoltageClass::Kv15, VoltageClass::Kv25, VoltageClass::Kv35];

    pub fn label(self) -> &'static str {
        match self {
            VoltageClass::Kv15 => "15 kV",
            VoltageClass::Kv25 => "25 kV",
            VoltageClass::Kv35 => "35 kV",
        }
    }

    /// Cable rating assumed when the user only names the termination tier.
    pub fn canonical_rating(self) -> CableVoltageRating {
        match self {
            VoltageClass::Kv15 => CableVoltageRating::R8_7_15,
            VoltageClass::Kv25 => CableVoltageRating::R15_25,
            VoltageClass::Kv35 => CableVoltageRating::R20_35,
        }
    }
}

impl fmt::Display for VoltageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VoltageClass {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_label(s).as_str() {
            "15" => Ok(VoltageClass::Kv15),
            "25" => Ok(VoltageClass::Kv25),
            "35" => Ok(VoltageClass::Kv35),
            _ => Err(EstimateError::UnknownVoltageClass(s.trim().to_string())),
        }
    }
}

/// IEC-style cable rating `U0/U` (kV).
///
/// Insulation constants (nominal thickness, tolerance, jacket offset and the
/// reinforced override) are keyed by rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CableVoltageRating {
    #[serde(rename = "8.7/15")]
    R8_7_15,
    #[serde(rename = "12/20")]
    R12_20,
    #[serde(rename = "15/25")]
    R15_25,
    #[serde(rename = "20/35")]
    R20_35,
}

impl CableVoltageRating {
    pub const ALL: [CableVoltageRating; 4] = [
        CableVoltageRating::R8_7_15,
        CableVoltageRating::R12_20,
        CableVoltageRating::R15_25,
        CableVoltageRating::R20_35,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CableVoltageRating::R8_7_15 => "8.7/15",
            CableVoltageRating::R12_20 => "12/20",
            CableVoltageRating::R15_25 => "15/25",
            CableVoltageRating::R20_35 => "20/35",
        }
    }

    /// Termination tier this rating is served by.
    pub fn voltage_class(self) -> VoltageClass {
        match self {
            CableVoltageRating::R8_7_15 => VoltageClass::Kv15,
            CableVoltageRating::R12_20 | CableVoltageRating::R15_25 => VoltageClass::Kv25,
            CableVoltageRating::R20_35 => VoltageClass::Kv35,
        }
    }

    /// Nominal insulation wall thickness (mm).
    pub fn nominal_thickness_mm(self) -> f64 {
        match self {
            CableVoltageRating::R8_7_15 => 3.0,
            CableVoltageRating::R12_20 => 4.0,
            CableVoltageRating::R15_25 => 5.5,
            CableVoltageRating::R20_35 => 7.5,
        }
    }

    /// Total tolerance (± mm) of the insulation outer diameter.
    pub fn tolerance_mm(self) -> f64 {
        match self {
            CableVoltageRating::R8_7_15 => 0.8,
            CableVoltageRating::R12_20 => 1.0,
            CableVoltageRating::R15_25 => 1.2,
            CableVoltageRating::R20_35 => 1.6,
        }
    }

    /// Outer jacket diameter minus insulation diameter (mm).
    pub fn jacket_offset_mm(self) -> f64 {
        match self {
            CableVoltageRating::R8_7_15 => 9.0,
            CableVoltageRating::R12_20 => 9.5,
            CableVoltageRating::R15_25 => 11.0,
            CableVoltageRating::R20_35 => 12.0,
        }
    }

    /// Insulation thickness of the reinforced (wind-turbine) variant, if one exists.
    pub fn reinforced_thickness_mm(self) -> Option<f64> {
        match self {
            CableVoltageRating::R20_35 => Some(8.8),
            _ => None,
        }
    }

    /// Diameter added by reinforced insulation: `2 × (reinforced − nominal)`.
    ///
    /// Zero for ratings without an override, so the flag is silently ignored there.
    pub fn reinforced_adjustment_mm(self, reinforced: bool) -> f64 {
        match self.reinforced_thickness_mm() {
            Some(t) if reinforced => 2.0 * (t - self.nominal_thickness_mm()),
            _ => 0.0,
        }
    }
}

impl fmt::Display for CableVoltageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CableVoltageRating {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_label(s).replace(',', ".").as_str() {
            "8.7/15" => Ok(CableVoltageRating::R8_7_15),
            "12/20" => Ok(CableVoltageRating::R12_20),
            "15/25" => Ok(CableVoltageRating::R15_25),
            "20/35" => Ok(CableVoltageRating::R20_35),
            _ => Err(EstimateError::UnknownVoltageClass(s.trim().to_string())),
        }
    }
}

/// Resolve a user- or file-supplied voltage label to a cable rating.
///
/// Accepts either an IEC rating (`"12/20"`, `"8.7/15 kV"`) or a termination
/// tier (`"25 kV"`), which maps to that tier's canonical rating.
pub fn parse_voltage_label(label: &str) -> Result<CableVoltageRating, EstimateError> {
    label
        .parse::<CableVoltageRating>()
        .or_else(|_| label.parse::<VoltageClass>().map(VoltageClass::canonical_rating))
}

fn compact_label(s: &str) -> String {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.strip_suffix("kv").unwrap_or(&compact).to_string()
}

/// Connector attachment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectorKind {
    ShearBolt,
    Compression,
}

impl ConnectorKind {
    pub fn label(self) -> &'static str {
        match self {
            ConnectorKind::ShearBolt => "shear-bolt",
            ConnectorKind::Compression => "compression",
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConnectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match norm.as_str() {
            "shear-bolt" | "shearbolt" => Ok(ConnectorKind::ShearBolt),
            "compression" => Ok(ConnectorKind::Compression),
            _ => Err(format!("unknown connector type '{}'", s.trim())),
        }
    }
}

/// Which estimator back-end to use for bitola-based estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EstimateMethod {
    /// Fitted √S polynomial per class, closed-form when a class has no curve.
    Curve,
    /// Compact-conductor geometry plus nominal insulation walls.
    ClosedForm,
    /// Cable reference table first, then the fitted curve.
    Lookup,
}

/// One row of the cold-shrink termination catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminationRow {
    pub part_number: String,
    pub voltage_class: VoltageClass,
    pub range_min: f64,
    pub range_max: f64,
}

/// One row of the lug/connector catalog (range is conductor section, mm²).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorRow {
    pub code: String,
    pub kind: ConnectorKind,
    pub range_min: f64,
    pub range_max: f64,
    pub material: Option<String>,
}

/// A measured reference cable.
///
/// Used both for direct lookups and as training data for the curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableRecord {
    pub rating: CableVoltageRating,
    pub cross_section_mm2: f64,
    pub brand: Option<String>,
    pub cable_name: Option<String>,
    pub insulation_od_mm: f64,
    pub conductor_diameter_mm: Option<f64>,
    pub insulation_thickness_mm: Option<f64>,
}

/// How the insulation diameter used for matching was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiameterSource {
    Measured,
    FittedCurve,
    ClosedForm,
    DirectLookup,
    Jacket,
}

impl DiameterSource {
    pub fn is_estimate(self) -> bool {
        !matches!(self, DiameterSource::Measured)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DiameterSource::Measured => "measured",
            DiameterSource::FittedCurve => "fitted curve",
            DiameterSource::ClosedForm => "closed-form",
            DiameterSource::DirectLookup => "reference table",
            DiameterSource::Jacket => "jacket offset",
        }
    }
}

/// An insulation diameter (mm, one decimal) and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiameterEstimate {
    pub diameter_mm: f64,
    pub source: DiameterSource,
}

/// Round to one decimal place (the precision every estimate is reported in).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_labels_loosely() {
        assert_eq!("25 kV".parse::<VoltageClass>().unwrap(), VoltageClass::Kv25);
        assert_eq!("25kv".parse::<VoltageClass>().unwrap(), VoltageClass::Kv25);
        assert_eq!(" 35 ".parse::<VoltageClass>().unwrap(), VoltageClass::Kv35);
        assert!("69 kV".parse::<VoltageClass>().is_err());
    }

    #[test]
    fn voltage_label_accepts_rating_or_class() {
        assert_eq!(parse_voltage_label("12/20").unwrap(), CableVoltageRating::R12_20);
        assert_eq!(parse_voltage_label("8,7/15 kV").unwrap(), CableVoltageRating::R8_7_15);
        assert_eq!(parse_voltage_label("25 kV").unwrap(), CableVoltageRating::R15_25);
        assert_eq!(parse_voltage_label("15 kV").unwrap(), CableVoltageRating::R8_7_15);
        assert_eq!(
            parse_voltage_label("138 kV"),
            Err(EstimateError::UnknownVoltageClass("138 kV".to_string()))
        );
    }

    #[test]
    fn every_rating_maps_to_one_class() {
        for rating in CableVoltageRating::ALL {
            let class = rating.voltage_class();
            assert!(VoltageClass::ALL.contains(&class));
        }
        assert_eq!(CableVoltageRating::R12_20.voltage_class(), VoltageClass::Kv25);
    }

    #[test]
    fn reinforced_adjustment_only_for_20_35() {
        let adj = CableVoltageRating::R20_35.reinforced_adjustment_mm(true);
        assert!((adj - 2.6).abs() < 1e-12);
        assert_eq!(CableVoltageRating::R20_35.reinforced_adjustment_mm(false), 0.0);
        assert_eq!(CableVoltageRating::R15_25.reinforced_adjustment_mm(true), 0.0);
    }

    #[test]
    fn connector_kind_parsing() {
        assert_eq!("Shear Bolt".parse::<ConnectorKind>().unwrap(), ConnectorKind::ShearBolt);
        assert_eq!("compression".parse::<ConnectorKind>().unwrap(), ConnectorKind::Compression);
        assert!("crimp".parse::<ConnectorKind>().is_err());
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(26.4687), 26.5);
        assert_eq!(round1(9.04), 9.0);
    }
}
