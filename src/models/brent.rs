//! Bracketed root finding
//!
//! Brent's method: bisection interleaved with secant and inverse quadratic
//! interpolation steps. Requires the objective to change sign across the
//! bracket and is guaranteed to converge within it without derivatives,
//! which is what makes it safe against noisy market prices where a
//! vega-based Newton step can overshoot the valid volatility range.

use crate::core::{VolError, VolResult};

/// Default convergence tolerance on the root.
pub const DEFAULT_TOL: f64 = 1e-8;

/// Default iteration budget.
pub const DEFAULT_MAX_ITER: u32 = 100;

/// Find a root of `f` in `[a, b]`.
///
/// `f(a)` and `f(b)` must have opposite signs; otherwise
/// `VolError::Numerical` is returned without iterating. Exhausting the
/// iteration budget is also a `Numerical` error.
pub fn find_root<F>(f: F, a: f64, b: f64, tol: f64, max_iter: u32) -> VolResult<f64>
where
    F: Fn(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if (fa > 0.0 && fb > 0.0) || (fa < 0.0 && fb < 0.0) {
        return Err(VolError::numerical(format!(
            "objective does not bracket a root on [{a}, {b}]"
        )));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = 0.0_f64;
    let mut e = 0.0_f64;

    for _ in 0..max_iter {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            // Root no longer between b and c; rebracket with a.
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            // Keep b as the best estimate.
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);

        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Attempt an interpolation step.
            let s = fb / fa;
            let (mut p, mut q): (f64, f64);
            if a == c {
                // Secant
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                // Inverse quadratic
                let qa = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0));
                q = (qa - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                // Interpolation acceptable
                e = d;
                d = p / q;
            } else {
                // Fall back to bisection
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += if xm >= 0.0 { tol1 } else { -tol1 };
        }
        fb = f(b);
    }

    Err(VolError::numerical(format!(
        "root finder did not converge within {max_iter} iterations"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_root() {
        let root = find_root(|x| 2.0 * x - 1.0, 0.0, 2.0, DEFAULT_TOL, DEFAULT_MAX_ITER).unwrap();
        assert!((root - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_cubic_root() {
        // x^3 - 2x - 5 has a root near 2.0945514815
        let root = find_root(
            |x| x * x * x - 2.0 * x - 5.0,
            1.0,
            3.0,
            DEFAULT_TOL,
            DEFAULT_MAX_ITER,
        )
        .unwrap();
        assert!((root - 2.0945514815).abs() < 1e-7);
    }

    #[test]
    fn test_transcendental_root() {
        let root = find_root(|x| x.cos() - x, 0.0, 1.0, DEFAULT_TOL, DEFAULT_MAX_ITER).unwrap();
        assert!((root - 0.7390851332).abs() < 1e-7);
    }

    #[test]
    fn test_endpoint_root() {
        let root = find_root(|x| x - 1.0, 1.0, 2.0, DEFAULT_TOL, DEFAULT_MAX_ITER).unwrap();
        assert!((root - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_bracket() {
        // x^2 + 1 is positive everywhere
        let result = find_root(|x| x * x + 1.0, -1.0, 1.0, DEFAULT_TOL, DEFAULT_MAX_ITER);
        assert!(matches!(result, Err(VolError::Numerical(_))));
    }

    #[test]
    fn test_steep_function() {
        // Nearly vertical near the root; bisection safety net must hold
        let root = find_root(
            |x| (x - 0.3).powi(3) * 1e6,
            0.0,
            1.0,
            DEFAULT_TOL,
            DEFAULT_MAX_ITER,
        )
        .unwrap();
        assert!((root - 0.3).abs() < 1e-3);
    }
}
