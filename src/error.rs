//! Error types.
//!
//! Library code returns the typed errors below. The binary converts everything
//! into an [`AppError`], which carries the process exit code:
//!
//! - `2`: configuration and data files (unreadable table, bad row, unwritable output)
//! - `3`: invalid request (unknown voltage class, bad numeric input)
//! - `4`: internal failures (curve fitting, JSON encoding)

use std::path::PathBuf;

use thiserror::Error;

/// Startup-time failures while loading or writing reference tables.
///
/// These are fatal: no request can be served without the catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{}' is missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("'{}' line {line}: {message}", path.display())]
    InvalidRow {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("'{}' contains no usable rows", path.display())]
    Empty { path: PathBuf },

    #[error("'{}' defines more than one curve for {rating}", path.display())]
    DuplicateCurve { path: PathBuf, rating: String },

    #[error("failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },
}

/// Per-request estimation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("unknown voltage class `{0}`")]
    UnknownVoltageClass(String),

    #[error("cross section must be a positive number of mm², got {0}")]
    InvalidCrossSection(f64),

    #[error("jacket diameter {diameter} mm must exceed the {offset} mm jacket offset")]
    InvalidJacketDiameter { diameter: f64, offset: f64 },
}

/// Per-request range-matching failures (bad numeric inputs only).
///
/// An empty match list is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("match target must be a finite, non-negative value, got {0}")]
    InvalidTarget(f64),

    #[error("tolerance must be a finite, non-negative value, got {0}")]
    InvalidTolerance(f64),
}

/// Fitting failures raised by the offline curve trainer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {needed} points with distinct sections, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    #[error("least-squares system is too ill-conditioned to solve")]
    IllConditioned,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::new(2, format!("Configuration error: {err}"))
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::new(3, format!("Estimation failed: {err}"))
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError::new(3, format!("Invalid match request: {err}"))
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(4, format!("Curve fit failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_family() {
        let cfg: AppError = CatalogError::Empty {
            path: PathBuf::from("x.csv"),
        }
        .into();
        assert_eq!(cfg.exit_code(), 2);

        let est: AppError = EstimateError::UnknownVoltageClass("69 kV".to_string()).into();
        assert_eq!(est.exit_code(), 3);
        assert!(est.to_string().contains("69 kV"));

        let fit: AppError = FitError::IllConditioned.into();
        assert_eq!(fit.exit_code(), 4);
    }
}
