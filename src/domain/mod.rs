//! Domain types used throughout the selector.
//!
//! This module defines:
//!
//! - voltage labels (`VoltageClass`, `CableVoltageRating`) and the insulation
//!   constants keyed by rating
//! - typed catalog rows (`TerminationRow`, `ConnectorRow`, `CableRecord`)
//! - where the reference tables live (`DataPaths`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
