//! Command-line parsing for the cold-shrink termination selector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation/matching code. Dispatch lives in [`crate::app`].

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};

use crate::domain::{CableVoltageRating, ConnectorKind, EstimateMethod, parse_voltage_label};
use crate::fit::DEFAULT_MIN_SAMPLES;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "csto", version, about = "Cold-shrink termination & connector selector")]
pub struct Cli {
    /// Directory holding the reference tables (overrides CSTO_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select terminations (and optionally connectors) for a cable.
    Select(SelectArgs),
    /// Estimate the insulation outer diameter from the conductor section.
    Estimate(EstimateArgs),
    /// Fit the per-rating diameter curves from the reference cable table.
    Train(TrainArgs),
    /// Show voltage classes, standard sections, materials and brands in the catalog.
    List,
}

#[derive(Debug, Args, Clone)]
#[command(group(
    ArgGroup::new("diameter_input")
        .required(true)
        .args(["diameter", "section", "jacket"])
))]
pub struct SelectArgs {
    /// Cable rating (8.7/15, 12/20, 15/25, 20/35) or termination class (15, 25, 35 kV).
    #[arg(long, value_parser = parse_voltage_label)]
    pub voltage: CableVoltageRating,

    /// Measured insulation outer diameter (mm).
    #[arg(long, value_parser = parse_decimal)]
    pub diameter: Option<f64>,

    /// Conductor cross section (mm²); the diameter is estimated.
    #[arg(long, value_parser = parse_decimal)]
    pub section: Option<f64>,

    /// Measured outer jacket diameter (mm); the jacket offset is subtracted.
    #[arg(long, value_parser = parse_decimal)]
    pub jacket: Option<f64>,

    /// Reinforced insulation (affects 20/35 only).
    #[arg(long, conflicts_with_all = ["diameter", "jacket"])]
    pub reinforced: bool,

    /// Cable brand for reference-table lookups.
    #[arg(long, conflicts_with_all = ["diameter", "jacket"])]
    pub brand: Option<String>,

    /// Match tolerance (mm). Defaults to the rating's tolerance.
    #[arg(long, value_parser = parse_decimal, conflicts_with = "exact")]
    pub tolerance: Option<f64>,

    /// Match nominal ranges only (tolerance 0).
    #[arg(long)]
    pub exact: bool,

    /// Also select a connector of this type.
    #[arg(long, value_enum)]
    pub connector: Option<ConnectorKind>,

    /// Lug material (compression connectors only).
    #[arg(long, requires = "connector")]
    pub material: Option<String>,

    /// Conductor section for the connector search (defaults to --section).
    #[arg(long, value_parser = parse_decimal, requires = "connector")]
    pub conductor_section: Option<f64>,

    /// Estimation back-end for --section.
    #[arg(long, value_enum, default_value_t = EstimateMethod::Curve)]
    pub method: EstimateMethod,

    /// Export the matches to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print the outcome as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Cable rating or termination class.
    #[arg(long, value_parser = parse_voltage_label)]
    pub voltage: CableVoltageRating,

    /// Conductor cross section (mm²).
    #[arg(long, value_parser = parse_decimal)]
    pub section: f64,

    /// Reinforced insulation (affects 20/35 only).
    #[arg(long)]
    pub reinforced: bool,

    /// Cable brand for reference-table lookups.
    #[arg(long)]
    pub brand: Option<String>,

    /// Estimation back-end.
    #[arg(long, value_enum, default_value_t = EstimateMethod::Curve)]
    pub method: EstimateMethod,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Where to write the coefficients (defaults to the configured curve table).
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Cables per rating needed for a quadratic fit.
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLES)]
    pub min_samples: usize,
}

/// Parse a decimal that may use a comma separator ("95,5").
pub fn parse_decimal(s: &str) -> Result<f64, String> {
    let normalized = s.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{}' is not a number", s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("csto").chain(args.iter().copied()))
    }

    #[test]
    fn select_with_section_and_connector() {
        let cli = parse(&[
            "select",
            "--voltage",
            "25 kV",
            "--section",
            "95",
            "--connector",
            "compression",
            "--material",
            "Copper",
        ])
        .unwrap();
        let Command::Select(args) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.voltage, CableVoltageRating::R15_25);
        assert_eq!(args.section, Some(95.0));
        assert_eq!(args.connector, Some(ConnectorKind::Compression));
        assert_eq!(args.method, EstimateMethod::Curve);
    }

    #[test]
    fn select_requires_exactly_one_diameter_input() {
        assert!(parse(&["select", "--voltage", "15/25"]).is_err());
        assert!(parse(&["select", "--voltage", "15/25", "--diameter", "26", "--jacket", "38"]).is_err());
    }

    #[test]
    fn exact_conflicts_with_tolerance() {
        assert!(parse(&["select", "--voltage", "15/25", "--diameter", "26", "--exact", "--tolerance", "1"]).is_err());
    }

    #[test]
    fn reinforced_needs_section() {
        assert!(parse(&["select", "--voltage", "20/35", "--diameter", "30", "--reinforced"]).is_err());
        assert!(parse(&["select", "--voltage", "20/35", "--jacket", "42", "--reinforced"]).is_err());
        assert!(parse(&["select", "--voltage", "20/35", "--reinforced"]).is_err());
    }

    #[test]
    fn brand_needs_section() {
        assert!(parse(&["select", "--voltage", "15/25", "--diameter", "26", "--brand", "Nexans"]).is_err());
        assert!(parse(&["select", "--voltage", "15/25", "--jacket", "38", "--brand", "Nexans"]).is_err());
        assert!(parse(&["select", "--voltage", "15/25", "--section", "95", "--brand", "Nexans"]).is_ok());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["list", "--data-dir", "tables", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("tables")));
    }

    #[test]
    fn decimal_comma_accepted() {
        assert_eq!(parse_decimal("26,5"), Ok(26.5));
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("inf").is_err());
    }

    #[test]
    fn unknown_voltage_rejected() {
        assert!(parse(&["estimate", "--voltage", "69 kV", "--section", "95"]).is_err());
    }
}
