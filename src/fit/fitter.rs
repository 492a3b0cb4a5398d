//! Low-level polynomial least-squares fit.
//!
//! Given:
//! - abscissae `x_i` (here `√S`)
//! - observed values `y_i` (insulation OD, mm)
//! - a polynomial degree `d`
//!
//! we solve the OLS problem on the design matrix `[x^d, …, x, 1]` and report
//! RMSE / R² on the training points.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;
use crate::math::{fill_power_row, horner, solve_least_squares};

/// Result of a single polynomial fit.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    /// Coefficients, highest power first.
    pub coeffs: Vec<f64>,
    pub rmse: f64,
    /// `1 − SSE/SST`; `None` when the observations have no variance.
    pub r2: Option<f64>,
    pub n: usize,
}

impl PolyFit {
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn predict(&self, x: f64) -> f64 {
        horner(&self.coeffs, x)
    }
}

/// Fit `y ≈ poly_d(x)` by least squares.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<PolyFit, FitError> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len().min(y.len());
    let p = degree + 1;

    let distinct = count_distinct(&x[..n]);
    if distinct < p {
        return Err(FitError::TooFewPoints { needed: p, got: distinct });
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x[..n].iter().enumerate() {
        fill_power_row(xi, &mut row);
        for (j, &v) in row.iter().enumerate() {
            design[(i, j)] = v;
        }
    }
    let target = DVector::from_row_slice(&y[..n]);

    let beta = solve_least_squares(&design, &target).ok_or(FitError::IllConditioned)?;
    let coeffs: Vec<f64> = beta.iter().copied().collect();

    let sse: f64 = x[..n]
        .iter()
        .zip(&y[..n])
        .map(|(&xi, &yi)| (yi - horner(&coeffs, xi)).powi(2))
        .sum();
    let mean = y[..n].iter().sum::<f64>() / n as f64;
    let sst: f64 = y[..n].iter().map(|&yi| (yi - mean).powi(2)).sum();
    let r2 = (sst > 0.0).then(|| 1.0 - sse / sst);

    Ok(PolyFit {
        coeffs,
        rmse: (sse / n as f64).sqrt(),
        r2,
        n,
    })
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    sorted.len()
}
