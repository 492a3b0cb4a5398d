//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation/matching code stays clean and testable
//! - output changes are localized (the tests below pin the table layout)

use crate::app::pipeline::SelectionOutcome;
use crate::catalog::Catalog;
use crate::domain::{CableVoltageRating, DiameterEstimate};
use crate::fit::TrainingReport;
use crate::matching::{ConnectorMatch, TerminationMatch};

/// Format a full selection outcome (diameter, matches, advisories).
pub fn format_outcome(outcome: &SelectionOutcome) -> String {
    let mut out = String::new();

    out.push_str("=== csto - termination & connector selection ===\n");
    out.push_str(&format!(
        "Voltage: {} ({})\n",
        outcome.voltage.label(),
        outcome.voltage_class
    ));
    out.push_str(&format!(
        "Insulation OD: {} mm ({})\n",
        format_mm(outcome.diameter.diameter_mm),
        outcome.diameter.source.display_name()
    ));
    out.push_str(&format!("Tolerance: ±{} mm\n", format_mm(outcome.tolerance_mm)));

    out.push_str("\nTerminations:\n");
    if outcome.terminations.is_empty() {
        out.push_str("  (none)\n");
    } else {
        out.push_str(&format_terminations(&outcome.terminations));
    }

    if let Some(section) = outcome.connector_section_mm2 {
        out.push_str(&format!("\nConnectors ({section} mm²):\n"));
        if outcome.connectors.is_empty() {
            out.push_str("  (none)\n");
        } else {
            out.push_str(&format_connectors(&outcome.connectors));
        }
    }

    if !outcome.advisories.is_empty() {
        out.push_str("\nNotes:\n");
        for advisory in &outcome.advisories {
            out.push_str(&format!("- {advisory}\n"));
        }
    }

    out
}

/// Termination matches as a fixed-width table.
pub fn format_terminations(rows: &[TerminationMatch]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<20} {:>8} {:>8} {:<24}", "part", "min_mm", "max_mm", "status"),
    );
    push_line(&mut out, format!("{:-<20} {:-<8} {:-<8} {:-<24}", "", "", "", ""));
    for m in rows {
        push_line(
            &mut out,
            format!(
                "{:<20} {:>8.1} {:>8.1} {:<24}",
                truncate(&m.part_number, 20),
                m.range_min,
                m.range_max,
                m.status().display_name()
            ),
        );
    }
    out
}

/// Connector matches as a fixed-width table.
pub fn format_connectors(rows: &[ConnectorMatch]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<20} {:>8} {:>8} {:<12} {:<24}",
            "code", "min_mm2", "max_mm2", "material", "status"
        ),
    );
    push_line(&mut out, format!("{:-<20} {:-<8} {:-<8} {:-<12} {:-<24}", "", "", "", "", ""));
    for m in rows {
        push_line(
            &mut out,
            format!(
                "{:<20} {:>8} {:>8} {:<12} {:<24}",
                truncate(&m.code, 20),
                m.range_min,
                m.range_max,
                truncate(m.material.as_deref().unwrap_or("-"), 12),
                m.status().display_name()
            ),
        );
    }
    out
}

/// One-line estimate summary for `csto estimate`.
pub fn format_estimate(
    rating: CableVoltageRating,
    cross_section_mm2: f64,
    reinforced: bool,
    estimate: &DiameterEstimate,
) -> String {
    let reinforced = if reinforced { ", reinforced" } else { "" };
    format!(
        "{} {cross_section_mm2} mm²{reinforced}: insulation OD ≈ {:.1} mm ({})\n",
        rating.label(),
        estimate.diameter_mm,
        estimate.source.display_name()
    )
}

/// Per-rating fit diagnostics for `csto train`.
pub fn format_training_report(report: &TrainingReport) -> String {
    let mut out = String::new();
    out.push_str("Curve fits (OD = a2·x² + a1·x + a0, x = √S):\n");
    push_line(
        &mut out,
        format!(
            "{:<8} {:>4} {:>4} {:>10} {:>10} {:>10} {:>8} {:>8}",
            "rating", "n", "deg", "a2", "a1", "a0", "R2", "RMSE"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<8} {:-<4} {:-<4} {:-<10} {:-<10} {:-<10} {:-<8} {:-<8}",
            "", "", "", "", "", "", "", ""
        ),
    );
    for fit in &report.fits {
        let c = &fit.coefficients;
        let r2 = c.r2.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string());
        push_line(
            &mut out,
            format!(
                "{:<8} {:>4} {:>4} {:>10.5} {:>10.4} {:>10.3} {:>8} {:>8.3}",
                fit.rating.label(),
                fit.samples,
                fit.degree(),
                c.a2,
                c.a1,
                c.a0,
                r2,
                fit.rmse
            ),
        );
    }
    for (rating, reason) in &report.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", rating.label()));
    }
    out
}

/// Catalog overview for `csto list`.
pub fn format_listing(catalog: &Catalog) -> String {
    let mut out = String::new();

    let classes: Vec<String> = catalog.voltage_classes().iter().map(|c| c.to_string()).collect();
    out.push_str(&format!("Voltage classes: {}\n", join_or_none(&classes)));

    let ratings: Vec<&str> = CableVoltageRating::ALL.iter().map(|r| r.label()).collect();
    out.push_str(&format!("Cable ratings: {}\n", ratings.join(", ")));

    let sections: Vec<String> = catalog.standard_sections().iter().map(|s| s.to_string()).collect();
    out.push_str(&format!("Standard sections (mm²): {}\n", join_or_none(&sections)));

    out.push_str(&format!("Compression materials: {}\n", join_or_none(&catalog.materials())));

    for rating in CableVoltageRating::ALL {
        let brands = catalog.brands(rating);
        if !brands.is_empty() {
            out.push_str(&format!("Brands ({}): {}\n", rating.label(), brands.join(", ")));
        }
    }

    out.push_str(&format!(
        "Rows: {} cables, {} terminations, {} connectors\n",
        catalog.cables().len(),
        catalog.terminations().len(),
        catalog.connectors().len()
    ));
    if !catalog.skipped_cable_rows().is_empty() {
        out.push_str(&format!(
            "Skipped cable rows: {}\n",
            catalog.skipped_cable_rows().len()
        ));
    }
    out
}

/// Millimetres with one decimal, or every digit when one decimal would round.
///
/// Measured inputs are matched as given, so `26.55` must not print as `26.6`.
pub fn format_mm(value: f64) -> String {
    let short = format!("{value:.1}");
    if short.parse::<f64>() == Ok(value) {
        short
    } else {
        value.to_string()
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{Advisory, PartTable};
    use crate::domain::{CableRecord, ConnectorKind, ConnectorRow, DiameterSource, TerminationRow, VoltageClass};

    fn outcome() -> SelectionOutcome {
        SelectionOutcome {
            voltage: CableVoltageRating::R15_25,
            voltage_class: VoltageClass::Kv25,
            diameter: DiameterEstimate {
                diameter_mm: 36.0,
                source: DiameterSource::Measured,
            },
            tolerance_mm: 1.2,
            terminations: vec![TerminationMatch {
                part_number: "25-CSTO-B".to_string(),
                range_min: 20.4,
                range_max: 35.4,
                nominal_fit: false,
            }],
            connector_section_mm2: None,
            connectors: Vec::new(),
            advisories: vec![Advisory::ToleranceOnly {
                table: PartTable::Termination,
                part: "25-CSTO-B".to_string(),
            }],
        }
    }

    #[test]
    fn termination_table_layout() {
        let table = format_terminations(&outcome().terminations);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("part"));
        assert_eq!(lines[2], "25-CSTO-B                20.4     35.4 tolerance only - confirm");
    }

    #[test]
    fn outcome_lists_advisories_and_hides_connector_section() {
        let text = format_outcome(&outcome());
        assert!(text.contains("Insulation OD: 36.0 mm (measured)"));
        assert!(text.contains("Tolerance: ±1.2 mm"));
        assert!(text.contains("- 25-CSTO-B (termination) fits only within the tolerance band"));
        assert!(!text.contains("Connectors"));
    }

    #[test]
    fn empty_connector_search_prints_none() {
        let mut o = outcome();
        o.connector_section_mm2 = Some(95.0);
        let text = format_outcome(&o);
        assert!(text.contains("Connectors (95 mm²):\n  (none)"));
    }

    #[test]
    fn estimate_line_mentions_reinforced() {
        let est = DiameterEstimate {
            diameter_mm: 33.0,
            source: DiameterSource::FittedCurve,
        };
        let line = format_estimate(CableVoltageRating::R20_35, 95.0, true, &est);
        assert_eq!(line, "20/35 95 mm², reinforced: insulation OD ≈ 33.0 mm (fitted curve)\n");
    }

    #[test]
    fn listing_summarizes_catalog() {
        let catalog = Catalog::from_parts(
            vec![CableRecord {
                rating: CableVoltageRating::R15_25,
                cross_section_mm2: 95.0,
                brand: Some("Nexans".to_string()),
                cable_name: None,
                insulation_od_mm: 26.4,
                conductor_diameter_mm: None,
                insulation_thickness_mm: None,
            }],
            vec![TerminationRow {
                part_number: "15-CSTO-A".to_string(),
                voltage_class: VoltageClass::Kv15,
                range_min: 10.0,
                range_max: 20.0,
            }],
            vec![ConnectorRow {
                code: "CL-95-CU".to_string(),
                kind: ConnectorKind::Compression,
                range_min: 95.0,
                range_max: 95.0,
                material: Some("Copper".to_string()),
            }],
        );
        let text = format_listing(&catalog);
        assert!(text.contains("Voltage classes: 15 kV\n"));
        assert!(text.contains("Standard sections (mm²): 95\n"));
        assert!(text.contains("Compression materials: Copper\n"));
        assert!(text.contains("Brands (15/25): Nexans\n"));
        assert!(!text.contains("Brands (20/35)"));
        assert!(text.contains("Rows: 1 cables, 1 terminations, 1 connectors\n"));
    }

    #[test]
    fn measured_values_print_unrounded() {
        assert_eq!(format_mm(36.0), "36.0");
        assert_eq!(format_mm(26.5), "26.5");
        assert_eq!(format_mm(26.55), "26.55");
        assert_eq!(format_mm(0.25), "0.25");

        let mut o = outcome();
        o.diameter.diameter_mm = 26.55;
        o.tolerance_mm = 0.25;
        let text = format_outcome(&o);
        assert!(text.contains("Insulation OD: 26.55 mm (measured)"));
        assert!(text.contains("Tolerance: ±0.25 mm"));
    }

    #[test]
    fn truncate_marks_cut_strings() {
        assert_eq!(truncate("ABCDEFGH", 5), "ABCD.");
        assert_eq!(truncate("ABC", 5), "ABC");
    }
}
