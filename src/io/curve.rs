//! Read/write the curve coefficients table.
//!
//! The coefficients CSV is the hand-off between the offline trainer and the
//! estimator:
//!
//! ```text
//! VoltageClass,a2,a1,a0,R2
//! 8.7/15,0.0021,1.387,8.52,0.991
//! 25 kV,0,2.1,6.0,
//! ```
//!
//! Labels may be ratings or termination tiers (a tier stands for its canonical
//! rating). An empty or `NaN` `R2` marks a linear fallback fit.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::parse_voltage_label;
use crate::error::CatalogError;
use crate::io::ingest::{Column, CsvTable, VOLTAGE_CLASS, get_optional, get_required, parse_f64};
use crate::models::{CurveCoefficients, CurveModel};

const A2: Column = Column::new("a2", &[]);
const A1: Column = Column::new("a1", &[]);
const A0: Column = Column::new("a0", &[]);
const R2: Column = Column::new("R2", &[]);

/// Read the coefficients table into a [`CurveModel`].
pub fn read_curves_csv(path: &Path) -> Result<CurveModel, CatalogError> {
    let mut table = CsvTable::open(path)?;
    let class_idx = table.required(VOLTAGE_CLASS)?;
    let a2_idx = table.required(A2)?;
    let a1_idx = table.required(A1)?;
    let a0_idx = table.required(A0)?;
    let r2_idx = table.optional(R2);

    let parsed = table.records();
    let mut model = CurveModel::new();

    for (line, result) in parsed {
        let record = result.map_err(|e| table.invalid_row(line, format!("CSV parse error: {e}")))?;

        let rating = get_required(&record, class_idx, VOLTAGE_CLASS)
            .and_then(|s| parse_voltage_label(s).map_err(|e| e.to_string()))
            .map_err(|m| table.invalid_row(line, m))?;

        let coefficient = |idx: usize, column: Column| {
            get_required(&record, idx, column).and_then(|s| parse_f64(s, column))
        };
        let a2 = coefficient(a2_idx, A2).map_err(|m| table.invalid_row(line, m))?;
        let a1 = coefficient(a1_idx, A1).map_err(|m| table.invalid_row(line, m))?;
        let a0 = coefficient(a0_idx, A0).map_err(|m| table.invalid_row(line, m))?;

        let r2 = r2_idx
            .and_then(|idx| get_optional(&record, idx))
            .filter(|s| !s.eq_ignore_ascii_case("nan"))
            .map(|s| parse_f64(s, R2))
            .transpose()
            .map_err(|m| table.invalid_row(line, m))?;

        let coeffs = CurveCoefficients { a2, a1, a0, r2 };
        if model.insert(rating, coeffs).is_some() {
            return Err(CatalogError::DuplicateCurve {
                path: table.path().to_path_buf(),
                rating: rating.label().to_string(),
            });
        }
    }

    if model.is_empty() {
        return Err(CatalogError::Empty {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), curves = model.len(), "loaded curve coefficients");
    Ok(model)
}

/// Write a [`CurveModel`] as a coefficients table (one row per rating).
pub fn write_curves_csv(path: &Path, model: &CurveModel) -> Result<(), CatalogError> {
    let write_err = |message: String| CatalogError::Write {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["VoltageClass", "a2", "a1", "a0", "R2"])
        .map_err(|e| write_err(e.to_string()))?;
    for (rating, c) in model.iter() {
        let r2 = c.r2.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                rating.label().to_string(),
                c.a2.to_string(),
                c.a1.to_string(),
                c.a0.to_string(),
                r2,
            ])
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CableVoltageRating;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn reads_class_and_rating_labels() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "VoltageClass,a2,a1,a0,R2\n25 kV,0,2.1,6.0,\n12/20,0.01,1.5,11.0,0.987\n20/35,0.0,2.0,15.0,NaN\n"
        )
        .unwrap();

        let model = read_curves_csv(file.path()).unwrap();
        assert_eq!(model.len(), 3);
        let c = model.get(CableVoltageRating::R15_25).unwrap();
        assert_eq!((c.a2, c.a1, c.a0, c.r2), (0.0, 2.1, 6.0, None));
        assert_eq!(model.get(CableVoltageRating::R12_20).unwrap().r2, Some(0.987));
        assert_eq!(model.get(CableVoltageRating::R20_35).unwrap().r2, None);
    }

    #[test]
    fn duplicate_rating_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "VoltageClass,a2,a1,a0,R2\n25 kV,0,2.1,6.0,\n15/25,0,2.0,6.5,\n").unwrap();
        assert!(matches!(
            read_curves_csv(file.path()),
            Err(CatalogError::DuplicateCurve { .. })
        ));
    }

    #[test]
    fn written_table_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        let model: CurveModel = [
            (CableVoltageRating::R8_7_15, CurveCoefficients::quadratic(0.0123, 1.41, 8.05).with_r2(Some(0.993))),
            (CableVoltageRating::R20_35, CurveCoefficients::quadratic(0.0, 1.88, 18.2)),
        ]
        .into_iter()
        .collect();

        write_curves_csv(&path, &model).unwrap();
        assert_eq!(read_curves_csv(&path).unwrap(), model);
    }
}
