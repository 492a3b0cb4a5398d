//! In-memory catalog store.
//!
//! Holds the three reference tables after validation. The store has no
//! mutation API: it is built once at startup and shared read-only (wrap it in
//! an `Arc` to hand it to several threads; replacing the catalog means
//! building a new one).

use std::collections::BTreeSet;

use crate::domain::{CableRecord, CableVoltageRating, ConnectorKind, ConnectorRow, DataPaths, TerminationRow, VoltageClass};
use crate::error::CatalogError;
use crate::io::ingest::{RowError, load_cable_records, load_connectors, load_terminations};

/// Sections closer than this are the same bitola.
const SECTION_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cables: Vec<CableRecord>,
    terminations: Vec<TerminationRow>,
    connectors: Vec<ConnectorRow>,
    skipped_cable_rows: Vec<RowError>,
}

impl Catalog {
    /// Load and validate all three tables. Any failure is fatal.
    pub fn load(paths: &DataPaths) -> Result<Self, CatalogError> {
        let cables = load_cable_records(&paths.cables)?;
        let terminations = load_terminations(&paths.terminations)?;
        let connectors = load_connectors(&paths.connectors)?;

        Ok(Self {
            cables: cables.records,
            terminations,
            connectors,
            skipped_cable_rows: cables.row_errors,
        })
    }

    /// Build a catalog from already-validated rows.
    pub fn from_parts(
        cables: Vec<CableRecord>,
        terminations: Vec<TerminationRow>,
        connectors: Vec<ConnectorRow>,
    ) -> Self {
        Self {
            cables,
            terminations,
            connectors,
            skipped_cable_rows: Vec::new(),
        }
    }

    pub fn cables(&self) -> &[CableRecord] {
        &self.cables
    }

    pub fn terminations(&self) -> &[TerminationRow] {
        &self.terminations
    }

    pub fn connectors(&self) -> &[ConnectorRow] {
        &self.connectors
    }

    /// Cable rows dropped at load time (missing section or OD).
    pub fn skipped_cable_rows(&self) -> &[RowError] {
        &self.skipped_cable_rows
    }

    /// Termination tiers present in the catalog, lowest kV first.
    pub fn voltage_classes(&self) -> Vec<VoltageClass> {
        self.terminations
            .iter()
            .map(|t| t.voltage_class)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct cross sections (mm²) of the reference cables, ascending.
    pub fn standard_sections(&self) -> Vec<f64> {
        let mut sections: Vec<f64> = self.cables.iter().map(|c| c.cross_section_mm2).collect();
        sections.sort_by(f64::total_cmp);
        sections.dedup_by(|a, b| (*a - *b).abs() < SECTION_EPS);
        sections
    }

    /// Compression lug materials, sorted and de-duplicated ignoring case.
    pub fn materials(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out: Vec<String> = self
            .connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::Compression)
            .filter_map(|c| c.material.as_deref())
            .filter(|m| seen.insert(m.to_lowercase()))
            .map(str::to_string)
            .collect();
        out.sort_by_key(|m| m.to_lowercase());
        out
    }

    /// Brands listed for a rating, sorted.
    pub fn brands(&self, rating: CableVoltageRating) -> Vec<String> {
        self.cables
            .iter()
            .filter(|c| c.rating == rating)
            .filter_map(|c| c.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Reference cables with the given rating and section (and brand, ignoring case).
    pub fn cable_records<'a>(
        &'a self,
        rating: CableVoltageRating,
        cross_section_mm2: f64,
        brand: Option<&'a str>,
    ) -> impl Iterator<Item = &'a CableRecord> + 'a {
        self.cables.iter().filter(move |c| {
            c.rating == rating
                && (c.cross_section_mm2 - cross_section_mm2).abs() < SECTION_EPS
                && brand.is_none_or(|b| c.brand.as_deref().is_some_and(|cb| cb.eq_ignore_ascii_case(b)))
        })
    }
}
