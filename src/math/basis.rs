//! Polynomial basis in `x = √S`.
//!
//! The insulation curves are low-degree polynomials in the square root of the
//! conductor cross section:
//!
//! ```text
//! OD(S) = a_d·x^d + … + a_1·x + a_0,   x = √S
//! ```
//!
//! Coefficients are stored highest power first (same order as the
//! coefficients table: `a2, a1, a0`).

/// Fill a design row `[x^d, …, x, 1]` for a polynomial of degree `out.len() - 1`.
pub fn fill_power_row(x: f64, out: &mut [f64]) {
    let mut p = 1.0;
    for slot in out.iter_mut().rev() {
        *slot = p;
        p *= x;
    }
}

/// Evaluate a polynomial (highest power first) with Horner's scheme.
pub fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}
