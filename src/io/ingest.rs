//! CSV ingest and normalization for the reference tables.
//!
//! This module turns the three catalog CSVs into typed rows that are safe to
//! match against.
//!
//! Design goals:
//! - **Header normalization**: labels are trimmed, BOM-stripped and compared
//!   case/punctuation-insensitively, with a few known aliases per column
//! - **Strict part catalogs**: any malformed termination/connector row is a
//!   configuration error naming the line
//! - **Forgiving cable table**: rows without a section or insulation OD are
//!   skipped and reported (the table is partly sparse by nature)
//! - **Separation of concerns**: no matching logic here

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{
    CableRecord, ConnectorKind, ConnectorRow, TerminationRow, VoltageClass, parse_voltage_label,
};
use crate::error::CatalogError;

/// A column identified by its canonical label plus accepted aliases.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Column {
    pub(crate) const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }
}

pub(crate) const VOLTAGE_CLASS: Column = Column::new("VoltageClass", &["Voltage Class", "Voltage"]);
const PART_NUMBER: Column = Column::new("PartNumber", &["Part Number"]);
const RANGE_MIN: Column = Column::new("RangeMin", &["OD Min (mm)", "Min Conductor (mm²)", "Min Conductor"]);
const RANGE_MAX: Column = Column::new("RangeMax", &["OD Max (mm)", "Max Conductor (mm²)", "Max Conductor"]);

const CONNECTOR_TYPE: Column = Column::new("Type", &["Connector Type"]);
const MATERIAL: Column = Column::new("Material", &[]);
const CODE: Column = Column::new("Code", &["Connector Code"]);

const CABLE_RATING: Column = Column::new("CableVoltageRating", &["Voltage", "Classe de Tensão"]);
const CROSS_SECTION: Column = Column::new("CrossSectionArea", &["S_mm2", "Bitola (mm²)"]);
const BRAND: Column = Column::new("Brand", &["Fabricante"]);
const CABLE_NAME: Column = Column::new("CableName", &["Cable"]);
const INSULATION_OD: Column = Column::new("InsulationOD", &["OD_iso_mm", "OD Nominal (mm)"]);
const CONDUCTOR_DIAMETER: Column = Column::new("ConductorDiameter", &[]);
const INSULATION_THICKNESS: Column = Column::new("InsulationThickness", &[]);

/// A row-level problem in the cable table (the row was skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Cable table ingest output.
#[derive(Debug, Clone)]
pub struct CableTable {
    pub records: Vec<CableRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// An opened CSV with its normalized header index.
pub(crate) struct CsvTable {
    path: PathBuf,
    reader: csv::Reader<Cursor<Vec<u8>>>,
    header_map: HashMap<String, usize>,
}

impl CsvTable {
    pub(crate) fn open(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(bytes));

        let headers = reader
            .headers()
            .map_err(|source| CatalogError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            header_map: build_header_map(&headers),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn required(&self, column: Column) -> Result<usize, CatalogError> {
        self.optional(column).ok_or_else(|| CatalogError::MissingColumn {
            path: self.path.clone(),
            column: column.name,
        })
    }

    pub(crate) fn optional(&self, column: Column) -> Option<usize> {
        std::iter::once(column.name)
            .chain(column.aliases.iter().copied())
            .find_map(|label| self.header_map.get(&normalize_header_name(label)).copied())
    }

    /// Read every record with the 1-based file line it starts on.
    ///
    /// Quoted fields may span lines, so the number comes from the reader's
    /// position. That position is taken before blank lines are skipped, hence
    /// the adjustment in [`record_start_line`].
    pub(crate) fn records(&mut self) -> Vec<(usize, csv::Result<StringRecord>)> {
        let results: Vec<_> = self.reader.records().collect();
        let bytes = self.reader.get_ref().get_ref();

        let mut last_line = 1;
        results
            .into_iter()
            .map(|result| {
                let position = match &result {
                    Ok(record) => record.position(),
                    Err(err) => err.position(),
                };
                let line = position.map_or(last_line + 1, |p| record_start_line(bytes, p));
                last_line = line;
                (line, result)
            })
            .collect()
    }

    pub(crate) fn invalid_row(&self, line: usize, message: impl Into<String>) -> CatalogError {
        CatalogError::InvalidRow {
            path: self.path.clone(),
            line,
            message: message.into(),
        }
    }
}

/// Line of the first byte at or after `position` that is not a line break.
fn record_start_line(bytes: &[u8], position: &csv::Position) -> usize {
    let mut line = position.line() as usize;
    let start = usize::try_from(position.byte()).unwrap_or(usize::MAX);
    for &b in bytes.get(start..).unwrap_or_default() {
        match b {
            b'\n' => line += 1,
            b'\r' => {}
            _ => break,
        }
    }
    line
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// Normalize a header label for comparison.
///
/// `" OD Min (mm)"`, `"od_min_mm"` and `"ODMin(mm)"` all normalize to `"odminmm"`.
pub fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Load the termination catalog (`VoltageClass, PartNumber, RangeMin, RangeMax`).
pub fn load_terminations(path: &Path) -> Result<Vec<TerminationRow>, CatalogError> {
    let mut table = CsvTable::open(path)?;
    let class_idx = table.required(VOLTAGE_CLASS)?;
    let part_idx = table.required(PART_NUMBER)?;
    let min_idx = table.required(RANGE_MIN)?;
    let max_idx = table.required(RANGE_MAX)?;

    let parsed = table.records();
    let mut rows = Vec::with_capacity(parsed.len());

    for (line, result) in parsed {
        let record = result.map_err(|e| table.invalid_row(line, format!("CSV parse error: {e}")))?;
        if is_blank(&record) {
            continue;
        }

        let class_label = get_required(&record, class_idx, VOLTAGE_CLASS).map_err(|m| table.invalid_row(line, m))?;
        let voltage_class = parse_class(class_label).map_err(|m| table.invalid_row(line, m))?;
        let part_number = get_required(&record, part_idx, PART_NUMBER)
            .map_err(|m| table.invalid_row(line, m))?
            .to_string();
        let (range_min, range_max) =
            parse_range(&record, min_idx, max_idx).map_err(|m| table.invalid_row(line, m))?;

        rows.push(TerminationRow {
            part_number,
            voltage_class,
            range_min,
            range_max,
        });
    }

    if rows.is_empty() {
        return Err(CatalogError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), rows = rows.len(), "loaded termination catalog");
    Ok(rows)
}

/// Load the connector catalog (`Type, RangeMin, RangeMax, Material, Code`).
///
/// `Material` may be absent entirely (no compression filtering possible) or
/// blank on individual rows.
pub fn load_connectors(path: &Path) -> Result<Vec<ConnectorRow>, CatalogError> {
    let mut table = CsvTable::open(path)?;
    let type_idx = table.required(CONNECTOR_TYPE)?;
    let min_idx = table.required(RANGE_MIN)?;
    let max_idx = table.required(RANGE_MAX)?;
    let code_idx = table.required(CODE)?;
    let material_idx = table.optional(MATERIAL);

    let parsed = table.records();
    let mut rows = Vec::with_capacity(parsed.len());

    for (line, result) in parsed {
        let record = result.map_err(|e| table.invalid_row(line, format!("CSV parse error: {e}")))?;
        if is_blank(&record) {
            continue;
        }

        let kind = get_required(&record, type_idx, CONNECTOR_TYPE)
            .and_then(|s| s.parse::<ConnectorKind>())
            .map_err(|m| table.invalid_row(line, m))?;
        let code = get_required(&record, code_idx, CODE)
            .map_err(|m| table.invalid_row(line, m))?
            .to_string();
        let (range_min, range_max) =
            parse_range(&record, min_idx, max_idx).map_err(|m| table.invalid_row(line, m))?;
        let material = material_idx.and_then(|idx| get_optional(&record, idx)).map(str::to_string);

        rows.push(ConnectorRow {
            code,
            kind,
            range_min,
            range_max,
            material,
        });
    }

    if rows.is_empty() {
        return Err(CatalogError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), rows = rows.len(), "loaded connector catalog");
    Ok(rows)
}

/// Load the cable reference table.
///
/// Rows lacking a cross section or insulation OD are skipped and reported;
/// anything else malformed is a configuration error.
pub fn load_cable_records(path: &Path) -> Result<CableTable, CatalogError> {
    let mut table = CsvTable::open(path)?;
    let rating_idx = table.required(CABLE_RATING)?;
    let section_idx = table.required(CROSS_SECTION)?;
    let od_idx = table.required(INSULATION_OD)?;
    let brand_idx = table.optional(BRAND);
    let name_idx = table.optional(CABLE_NAME);
    let conductor_idx = table.optional(CONDUCTOR_DIAMETER);
    let thickness_idx = table.optional(INSULATION_THICKNESS);

    let parsed = table.records();
    let rows_read = parsed.len();
    let mut records = Vec::with_capacity(rows_read);
    let mut row_errors = Vec::new();

    for (line, result) in parsed {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }

        let rating = get_required(&record, rating_idx, CABLE_RATING)
            .and_then(|s| parse_voltage_label(s).map_err(|e| e.to_string()))
            .map_err(|m| table.invalid_row(line, m))?;

        let section = parse_opt_f64(get_optional(&record, section_idx), CROSS_SECTION)
            .map_err(|m| table.invalid_row(line, m))?;
        let od = parse_opt_f64(get_optional(&record, od_idx), INSULATION_OD)
            .map_err(|m| table.invalid_row(line, m))?;

        let (Some(cross_section_mm2), Some(insulation_od_mm)) = (section, od) else {
            row_errors.push(RowError {
                line,
                message: "missing cross section or insulation OD".to_string(),
            });
            continue;
        };
        if cross_section_mm2 <= 0.0 || insulation_od_mm <= 0.0 {
            return Err(table.invalid_row(line, "cross section and insulation OD must be positive"));
        }

        let optional_number = |idx: Option<usize>, column: Column| {
            parse_opt_f64(idx.and_then(|i| get_optional(&record, i)), column)
        };
        let conductor_diameter_mm =
            optional_number(conductor_idx, CONDUCTOR_DIAMETER).map_err(|m| table.invalid_row(line, m))?;
        let insulation_thickness_mm =
            optional_number(thickness_idx, INSULATION_THICKNESS).map_err(|m| table.invalid_row(line, m))?;

        records.push(CableRecord {
            rating,
            cross_section_mm2,
            brand: brand_idx.and_then(|i| get_optional(&record, i)).map(str::to_string),
            cable_name: name_idx.and_then(|i| get_optional(&record, i)).map(str::to_string),
            insulation_od_mm,
            conductor_diameter_mm,
            insulation_thickness_mm,
        });
    }

    for err in &row_errors {
        warn!(path = %path.display(), line = err.line, "skipped cable row: {}", err.message);
    }
    if records.is_empty() {
        return Err(CatalogError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!(
        path = %path.display(),
        rows = records.len(),
        skipped = row_errors.len(),
        "loaded cable reference table"
    );

    Ok(CableTable {
        records,
        row_errors,
        rows_read,
    })
}

/// Parse a termination tier from either a class (`25 kV`) or a rating (`15/25`).
pub(crate) fn parse_class(label: &str) -> Result<VoltageClass, String> {
    label
        .parse::<VoltageClass>()
        .or_else(|_| parse_voltage_label(label).map(|r| r.voltage_class()))
        .map_err(|e| e.to_string())
}

fn parse_range(record: &StringRecord, min_idx: usize, max_idx: usize) -> Result<(f64, f64), String> {
    let min = parse_f64(get_required(record, min_idx, RANGE_MIN)?, RANGE_MIN)?;
    let max = parse_f64(get_required(record, max_idx, RANGE_MAX)?, RANGE_MAX)?;
    if min > max {
        return Err(format!("RangeMin {min} exceeds RangeMax {max}"));
    }
    Ok((min, max))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

pub(crate) fn get_required<'a>(record: &'a StringRecord, idx: usize, column: Column) -> Result<&'a str, String> {
    get_optional(record, idx).ok_or_else(|| format!("missing value for `{}`", column.name))
}

pub(crate) fn get_optional(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a finite number, accepting a decimal comma (`"20,4"`).
pub(crate) fn parse_f64(s: &str, column: Column) -> Result<f64, String> {
    let normalized = if s.contains('.') { s.to_string() } else { s.replace(',', ".") };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number '{s}' in `{}`", column.name))
}

fn parse_opt_f64(s: Option<&str>, column: Column) -> Result<Option<f64>, String> {
    match s {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("nan") => Ok(None),
        Some(v) => parse_f64(v, column).map(Some),
    }
}
