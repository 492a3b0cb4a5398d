//! Least squares solver.
//!
//! The curve trainer solves tiny regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with 2–3 columns (`[√S, 1]` or `[S, √S, 1]`) and a handful of rows per
//! voltage class. We use SVD so tall systems solve without normal equations,
//! and reject solutions when the system is too close to singular (e.g. every
//! cable of a class has the same section).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // A rank-deficient design yields a minimum-norm solution that is not a
    // usable curve, so bail out instead.
    if svd.rank(1e-9) < x.ncols() {
        return None;
    }

    let beta = svd.solve(y, 1e-12).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn rank_deficient_design_is_rejected() {
        // Every row has the same x, so slope and intercept are not identifiable.
        let x = DMatrix::from_row_slice(3, 2, &[4.0, 1.0, 4.0, 1.0, 4.0, 1.0]);
        let y = DVector::from_row_slice(&[10.0, 11.0, 12.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
