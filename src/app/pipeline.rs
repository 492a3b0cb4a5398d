//! Shared selection pipeline used by every CLI subcommand.
//!
//! One request in, one outcome out:
//! diameter (measured / estimated / jacket) -> termination match -> connector match
//!
//! The [`Selector`] holds the immutable catalog and curve snapshot behind `Arc`s,
//! so it can be cloned into other threads. Nothing is carried between requests.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::domain::{
    CableVoltageRating, ConnectorKind, DataPaths, DiameterEstimate, DiameterSource, EstimateMethod,
    VoltageClass,
};
use crate::error::{AppError, EstimateError, MatchError};
use crate::estimate::{EstimationStrategy, from_jacket_diameter, strategy_for};
use crate::io::curve::read_curves_csv;
use crate::matching::{ConnectorFilter, ConnectorMatch, TerminationMatch, match_connectors, match_terminations};
use crate::models::CurveModel;

/// Connector ranges are matched exactly unless a caller asks otherwise.
pub const CONNECTOR_TOLERANCE_MM2: f64 = 0.0;

/// Where the insulation diameter comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DiameterInput {
    /// Measured insulation OD (mm).
    Measured(f64),
    /// Estimate from the conductor section.
    Bitola {
        cross_section_mm2: f64,
        reinforced: bool,
        brand: Option<String>,
    },
    /// Measured outer jacket diameter (mm).
    Jacket(f64),
}

impl DiameterInput {
    fn cross_section_mm2(&self) -> Option<f64> {
        match self {
            DiameterInput::Bitola { cross_section_mm2, .. } => Some(*cross_section_mm2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorQuery {
    pub kind: ConnectorKind,
    pub material: Option<String>,
    /// Falls back to the bitola section when omitted.
    pub cross_section_mm2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest {
    pub voltage: CableVoltageRating,
    pub diameter: DiameterInput,
    /// Defaults to the rating's tolerance; `Some(0.0)` is exact nominal matching.
    pub tolerance_mm: Option<f64>,
    pub connector: Option<ConnectorQuery>,
}

/// Which part table a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartTable {
    Termination,
    Connector,
}

impl PartTable {
    pub fn label(self) -> &'static str {
        match self {
            PartTable::Termination => "termination",
            PartTable::Connector => "connector",
        }
    }
}

/// Things the operator should know about an outcome. None of them is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Advisory {
    EstimatedDiameter { source: DiameterSource },
    ToleranceOnly { table: PartTable, part: String },
    NoTerminationFound { voltage_class: VoltageClass, diameter_mm: f64 },
    NoConnectorFound { connector: ConnectorKind, cross_section_mm2: f64 },
    ConnectorSkipped,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::EstimatedDiameter { source } => write!(
                f,
                "Diameter estimated ({}); confirm with a field measurement before ordering.",
                source.display_name()
            ),
            Advisory::ToleranceOnly { table, part } => write!(
                f,
                "{part} ({}) fits only within the tolerance band; confirm dimensions.",
                table.label()
            ),
            Advisory::NoTerminationFound {
                voltage_class,
                diameter_mm,
            } => write!(
                f,
                "No {voltage_class} termination covers {} mm.",
                crate::report::format_mm(*diameter_mm)
            ),
            Advisory::NoConnectorFound {
                connector,
                cross_section_mm2,
            } => write!(f, "No {connector} connector covers {cross_section_mm2} mm²."),
            Advisory::ConnectorSkipped => {
                f.write_str("Connector search skipped: no conductor section given.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOutcome {
    pub voltage: CableVoltageRating,
    pub voltage_class: VoltageClass,
    pub diameter: DiameterEstimate,
    pub tolerance_mm: f64,
    pub terminations: Vec<TerminationMatch>,
    /// Section (mm²) used for the connector search, when one ran.
    pub connector_section_mm2: Option<f64>,
    pub connectors: Vec<ConnectorMatch>,
    pub advisories: Vec<Advisory>,
}

/// Immutable selection context.
#[derive(Debug, Clone)]
pub struct Selector {
    catalog: Arc<Catalog>,
    curves: Option<Arc<CurveModel>>,
    method: EstimateMethod,
}

impl Selector {
    pub fn new(catalog: Arc<Catalog>, curves: Option<Arc<CurveModel>>, method: EstimateMethod) -> Self {
        Self {
            catalog,
            curves,
            method,
        }
    }

    /// Load the catalog and (if present) the curve table.
    ///
    /// A missing curve file is not an error; an unreadable one is.
    pub fn load(paths: &DataPaths, method: EstimateMethod) -> Result<Self, AppError> {
        let catalog = Catalog::load(paths)?;
        let curves = if paths.curves.exists() {
            Some(Arc::new(read_curves_csv(&paths.curves)?))
        } else {
            if method != EstimateMethod::ClosedForm {
                warn!(
                    path = %paths.curves.display(),
                    "curve table not found; bitola estimates use the closed form"
                );
            }
            None
        };
        Ok(Self::new(Arc::new(catalog), curves, method))
    }

    pub fn curves(&self) -> Option<&CurveModel> {
        self.curves.as_deref()
    }

    /// Bitola-based estimate with the configured method.
    pub fn estimate(
        &self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        reinforced: bool,
        brand: Option<&str>,
    ) -> Result<DiameterEstimate, EstimateError> {
        strategy_for(self.method, &self.catalog, self.curves(), brand).estimate(rating, cross_section_mm2, reinforced)
    }

    /// Resolve the diameter, then match terminations and (optionally) connectors.
    pub fn select(&self, request: &SelectionRequest) -> Result<SelectionOutcome, AppError> {
        let rating = request.voltage;
        let voltage_class = rating.voltage_class();

        let diameter = match &request.diameter {
            DiameterInput::Measured(mm) => {
                if !(mm.is_finite() && *mm >= 0.0) {
                    return Err(MatchError::InvalidTarget(*mm).into());
                }
                DiameterEstimate {
                    diameter_mm: *mm,
                    source: DiameterSource::Measured,
                }
            }
            DiameterInput::Bitola {
                cross_section_mm2,
                reinforced,
                brand,
            } => self.estimate(rating, *cross_section_mm2, *reinforced, brand.as_deref())?,
            DiameterInput::Jacket(mm) => from_jacket_diameter(rating, *mm)?,
        };
        debug!(
            rating = rating.label(),
            diameter_mm = diameter.diameter_mm,
            source = diameter.source.display_name(),
            "resolved insulation diameter"
        );

        let tolerance_mm = request.tolerance_mm.unwrap_or_else(|| rating.tolerance_mm());
        let terminations = match_terminations(
            self.catalog.terminations(),
            voltage_class,
            diameter.diameter_mm,
            tolerance_mm,
        )?;

        let mut advisories = Vec::new();
        if diameter.source.is_estimate() {
            advisories.push(Advisory::EstimatedDiameter {
                source: diameter.source,
            });
        }
        if terminations.is_empty() {
            advisories.push(Advisory::NoTerminationFound {
                voltage_class,
                diameter_mm: diameter.diameter_mm,
            });
        }
        advisories.extend(terminations.iter().filter(|m| !m.nominal_fit).map(|m| {
            Advisory::ToleranceOnly {
                table: PartTable::Termination,
                part: m.part_number.clone(),
            }
        }));

        let mut connectors = Vec::new();
        let mut connector_section_mm2 = None;
        if let Some(query) = &request.connector {
            match query.cross_section_mm2.or_else(|| request.diameter.cross_section_mm2()) {
                Some(section) => {
                    let filter = ConnectorFilter {
                        kind: query.kind,
                        material: query.material.as_deref(),
                    };
                    connectors =
                        match_connectors(self.catalog.connectors(), &filter, section, CONNECTOR_TOLERANCE_MM2)?;
                    connector_section_mm2 = Some(section);

                    if connectors.is_empty() {
                        advisories.push(Advisory::NoConnectorFound {
                            connector: query.kind,
                            cross_section_mm2: section,
                        });
                    }
                    advisories.extend(connectors.iter().filter(|m| !m.nominal_fit).map(|m| {
                        Advisory::ToleranceOnly {
                            table: PartTable::Connector,
                            part: m.code.clone(),
                        }
                    }));
                }
                None => advisories.push(Advisory::ConnectorSkipped),
            }
        }

        info!(
            rating = rating.label(),
            terminations = terminations.len(),
            connectors = connectors.len(),
            "selection complete"
        );

        Ok(SelectionOutcome {
            voltage: rating,
            voltage_class,
            diameter,
            tolerance_mm,
            terminations,
            connector_section_mm2,
            connectors,
            advisories,
        })
    }
}
