//! Input/output helpers.
//!
//! - CSV ingest + validation of the reference tables (`ingest`)
//! - selection exports (CSV/JSON) (`export`)
//! - curve coefficient table read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
