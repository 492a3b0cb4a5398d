//! Export selection results.
//!
//! - CSV: one row per matched part, easy to consume in spreadsheets
//! - JSON: the whole outcome plus a `generated_at` timestamp

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::app::pipeline::{PartTable, SelectionOutcome};
use crate::error::AppError;
use crate::report::format_mm;

pub const RESULTS_HEADER: [&str; 9] = [
    "table",
    "part",
    "range_min",
    "range_max",
    "material",
    "target",
    "tolerance",
    "nominal_fit",
    "status",
];

/// Write every matched termination and connector to a CSV file.
pub fn write_results_csv(path: &Path, outcome: &SelectionOutcome) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, outcome)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_results<W: Write>(sink: W, outcome: &SelectionOutcome) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(RESULTS_HEADER)?;

    let target = format_mm(outcome.diameter.diameter_mm);
    let tolerance = format_mm(outcome.tolerance_mm);
    for m in &outcome.terminations {
        writer.write_record([
            PartTable::Termination.label(),
            m.part_number.as_str(),
            m.range_min.to_string().as_str(),
            m.range_max.to_string().as_str(),
            "",
            target.as_str(),
            tolerance.as_str(),
            if m.nominal_fit { "true" } else { "false" },
            m.status().display_name(),
        ])?;
    }

    if let Some(section) = outcome.connector_section_mm2 {
        let target = section.to_string();
        for m in &outcome.connectors {
            writer.write_record([
                PartTable::Connector.label(),
                m.code.as_str(),
                m.range_min.to_string().as_str(),
                m.range_max.to_string().as_str(),
                m.material.as_deref().unwrap_or(""),
                target.as_str(),
                "0",
                if m.nominal_fit { "true" } else { "false" },
                m.status().display_name(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct OutcomeDocument<'a> {
    generated_at: String,
    #[serde(flatten)]
    outcome: &'a SelectionOutcome,
}

/// Pretty JSON for `--json`, stamped with `generated_at` (RFC 3339).
pub fn outcome_json(outcome: &SelectionOutcome, generated_at: DateTime<Local>) -> Result<String, AppError> {
    let doc = OutcomeDocument {
        generated_at: generated_at.to_rfc3339(),
        outcome,
    };
    serde_json::to_string_pretty(&doc).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::Advisory;
    use crate::domain::{CableVoltageRating, DiameterEstimate, DiameterSource, VoltageClass};
    use crate::matching::{ConnectorMatch, TerminationMatch};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn outcome() -> SelectionOutcome {
        SelectionOutcome {
            voltage: CableVoltageRating::R15_25,
            voltage_class: VoltageClass::Kv25,
            diameter: DiameterEstimate {
                diameter_mm: 26.5,
                source: DiameterSource::FittedCurve,
            },
            tolerance_mm: 1.2,
            terminations: vec![TerminationMatch {
                part_number: "25-CSTO-B".to_string(),
                range_min: 20.4,
                range_max: 35.4,
                nominal_fit: true,
            }],
            connector_section_mm2: Some(95.0),
            connectors: vec![ConnectorMatch {
                code: "CL-95-CU".to_string(),
                range_min: 95.0,
                range_max: 95.0,
                material: Some("Copper".to_string()),
                nominal_fit: true,
            }],
            advisories: vec![Advisory::EstimatedDiameter {
                source: DiameterSource::FittedCurve,
            }],
        }
    }

    #[test]
    fn csv_has_one_row_per_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results_csv(&path, &outcome()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], RESULTS_HEADER.join(","));
        assert_eq!(lines[1], "termination,25-CSTO-B,20.4,35.4,,26.5,1.2,true,nominal");
        assert_eq!(lines[2], "connector,CL-95-CU,95,95,Copper,95,0,true,nominal");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_keeps_measured_precision() {
        let mut o = outcome();
        o.diameter = DiameterEstimate {
            diameter_mm: 26.55,
            source: DiameterSource::Measured,
        };
        o.tolerance_mm = 0.25;
        o.connector_section_mm2 = None;

        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results_csv(&path, &o).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("termination,25-CSTO-B,20.4,35.4,,26.55,0.25,true,nominal")
        );
    }

    #[test]
    fn json_carries_timestamp_and_outcome() {
        let ts = Local.with_ymd_and_hms(2026, 3, 4, 10, 30, 0).unwrap();
        let text = outcome_json(&outcome(), ts).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert!(value["generated_at"].as_str().unwrap().starts_with("2026-03-04T10:30:00"));
        assert_eq!(value["voltage"], "15/25");
        assert_eq!(value["diameter"]["source"], "fitted-curve");
        assert_eq!(value["connectors"][0]["material"], "Copper");
        assert_eq!(value["advisories"][0]["kind"], "estimated-diameter");
    }
}
