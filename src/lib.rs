//! `csto-selector` library crate.
//!
//! The binary (`csto`) is a thin wrapper around this library so that:
//!
//! - estimation and matching are testable without spawning processes
//! - the catalog and selector can be embedded behind another front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod catalog;
pub mod cli;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod fit;
pub mod io;
pub mod matching;
pub mod math;
pub mod models;
pub mod report;
