//! Locations of the reference tables.
//!
//! Resolution order (later wins):
//!
//! 1. built-in defaults under `mapping_tables/`
//! 2. `.env` / process environment (`CSTO_DATA_DIR`, `CSTO_*_TABLE`)
//! 3. the CLI `--data-dir` flag (directory only)

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "mapping_tables";

const CABLE_FILE: &str = "bitola_to_od.csv";
const TERMINATION_FILE: &str = "csto_selection_table.csv";
const CONNECTOR_FILE: &str = "connector_selection_table.csv";
const CURVE_FILE: &str = "iso_curves_poly.csv";

/// Paths of the four tables the selector reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub cables: PathBuf,
    pub terminations: PathBuf,
    pub connectors: PathBuf,
    pub curves: PathBuf,
}

impl DataPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cables: dir.join(CABLE_FILE),
            terminations: dir.join(TERMINATION_FILE),
            connectors: dir.join(CONNECTOR_FILE),
            curves: dir.join(CURVE_FILE),
        }
    }

    /// Resolve paths from `.env` and the environment.
    ///
    /// `dir_override` (from `--data-dir`) replaces `CSTO_DATA_DIR` but per-table
    /// variables still take precedence for their file.
    pub fn from_env(dir_override: Option<&Path>) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(dir_override, |key| std::env::var(key).ok())
    }

    fn resolve(dir_override: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Self {
        let dir = match dir_override {
            Some(dir) => dir.to_path_buf(),
            None => var("CSTO_DATA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        };

        let mut paths = Self::in_dir(&dir);
        let table = |key: &str| var(key).filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        if let Some(p) = table("CSTO_CABLE_TABLE") {
            paths.cables = p;
        }
        if let Some(p) = table("CSTO_TERMINATION_TABLE") {
            paths.terminations = p;
        }
        if let Some(p) = table("CSTO_CONNECTOR_TABLE") {
            paths.connectors = p;
        }
        if let Some(p) = table("CSTO_CURVE_TABLE") {
            paths.curves = p;
        }
        paths
    }
}
