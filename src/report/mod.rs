//! Reporting utilities: terminal tables for selections, estimates, training and listings.

pub mod format;

pub use format::*;
