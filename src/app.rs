//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the data directory and loads the reference tables
//! - runs selections, estimates or curve training
//! - prints reports and writes optional exports

use clap::Parser;

use crate::catalog::Catalog;
use crate::cli::{Cli, Command, EstimateArgs, SelectArgs, TrainArgs};
use crate::domain::DataPaths;
use crate::error::AppError;
use crate::io::ingest::load_cable_records;

pub mod pipeline;

use pipeline::{ConnectorQuery, DiameterInput, SelectionRequest, Selector};

/// Entry point for the `csto` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = DataPaths::from_env(cli.data_dir.as_deref());
    match cli.command {
        Command::Select(args) => handle_select(&paths, args),
        Command::Estimate(args) => handle_estimate(&paths, args),
        Command::Train(args) => handle_train(&paths, args),
        Command::List => handle_list(&paths),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    // A second init (tests, embedding) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_select(paths: &DataPaths, args: SelectArgs) -> Result<(), AppError> {
    let selector = Selector::load(paths, args.method)?;
    let request = request_from_args(&args)?;
    let outcome = selector.select(&request)?;

    if args.json {
        println!("{}", crate::io::export::outcome_json(&outcome, chrono::Local::now())?);
    } else {
        print!("{}", crate::report::format_outcome(&outcome));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &outcome)?;
    }
    Ok(())
}

fn handle_estimate(paths: &DataPaths, args: EstimateArgs) -> Result<(), AppError> {
    let selector = Selector::load(paths, args.method)?;
    let estimate = selector.estimate(args.voltage, args.section, args.reinforced, args.brand.as_deref())?;
    print!(
        "{}",
        crate::report::format_estimate(args.voltage, args.section, args.reinforced, &estimate)
    );
    Ok(())
}

fn handle_train(paths: &DataPaths, args: TrainArgs) -> Result<(), AppError> {
    let table = load_cable_records(&paths.cables)?;
    let report = crate::fit::train_curves(&table.records, args.min_samples);
    print!("{}", crate::report::format_training_report(&report));

    if report.model.is_empty() {
        return Err(AppError::new(4, "No rating had enough reference cables to fit a curve."));
    }
    let out = args.out.unwrap_or_else(|| paths.curves.clone());
    crate::io::curve::write_curves_csv(&out, &report.model)?;
    println!("Wrote {} curve(s) to {}", report.model.len(), out.display());
    Ok(())
}

fn handle_list(paths: &DataPaths) -> Result<(), AppError> {
    let catalog = Catalog::load(paths)?;
    print!("{}", crate::report::format_listing(&catalog));
    Ok(())
}

/// Translate `select` flags into a pipeline request.
pub fn request_from_args(args: &SelectArgs) -> Result<SelectionRequest, AppError> {
    if args.section.is_none() && (args.reinforced || args.brand.is_some()) {
        return Err(AppError::new(
            3,
            "--reinforced and --brand only apply to --section estimates.",
        ));
    }

    let diameter = match (args.diameter, args.section, args.jacket) {
        (Some(mm), None, None) => DiameterInput::Measured(mm),
        (None, Some(section), None) => DiameterInput::Bitola {
            cross_section_mm2: section,
            reinforced: args.reinforced,
            brand: args.brand.clone(),
        },
        (None, None, Some(mm)) => DiameterInput::Jacket(mm),
        _ => {
            return Err(AppError::new(
                3,
                "Give exactly one of --diameter, --section or --jacket.",
            ));
        }
    };

    let tolerance_mm = if args.exact { Some(0.0) } else { args.tolerance };
    let connector = args.connector.map(|kind| ConnectorQuery {
        kind,
        material: args.material.clone(),
        cross_section_mm2: args.conductor_section,
    });

    Ok(SelectionRequest {
        voltage: args.voltage,
        diameter,
        tolerance_mm,
        connector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CableVoltageRating, ConnectorKind};

    fn select_args(argv: &[&str]) -> SelectArgs {
        let cli = Cli::try_parse_from(["csto", "select"].into_iter().chain(argv.iter().copied())).unwrap();
        match cli.command {
            Command::Select(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn exact_flag_means_zero_tolerance() {
        let args = select_args(&["--voltage", "15/25", "--diameter", "26.5", "--exact"]);
        let request = request_from_args(&args).unwrap();
        assert_eq!(request.tolerance_mm, Some(0.0));
        assert_eq!(request.diameter, DiameterInput::Measured(26.5));
    }

    #[test]
    fn section_flags_build_bitola_and_connector() {
        let args = select_args(&[
            "--voltage",
            "20/35",
            "--section",
            "240",
            "--reinforced",
            "--connector",
            "shear-bolt",
        ]);
        let request = request_from_args(&args).unwrap();
        assert_eq!(request.voltage, CableVoltageRating::R20_35);
        assert_eq!(
            request.diameter,
            DiameterInput::Bitola {
                cross_section_mm2: 240.0,
                reinforced: true,
                brand: None
            }
        );
        assert_eq!(request.tolerance_mm, None);
        let connector = request.connector.unwrap();
        assert_eq!(connector.kind, ConnectorKind::ShearBolt);
        assert_eq!(connector.cross_section_mm2, None);
    }

    #[test]
    fn section_only_flags_rejected_with_measured_diameter() {
        let mut args = select_args(&["--voltage", "20/35", "--diameter", "30"]);
        args.reinforced = true;
        let err = request_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let mut args = select_args(&["--voltage", "15/25", "--jacket", "38"]);
        args.brand = Some("Nexans".to_string());
        assert_eq!(request_from_args(&args).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn logging_init_is_idempotent() {
        init_logging(0);
        init_logging(2);
    }
}
