//! Black-Scholes pricing kernel
//!
//! Provides:
//! - Closed-form European call pricing with continuous dividend yield
//! - Implied volatility via bracketed root finding
//!
//! The solve is deliberately derivative-free: market mids are noisy and a
//! vega-based Newton iteration can diverge outside the valid volatility
//! range, while a bracketed solve either converges or reports failure.

use statrs::distribution::{ContinuousCDF, Normal};

use super::brent;
use crate::core::{VolError, VolResult};

/// Lower edge of the volatility search bracket.
pub const MIN_VOL: f64 = 1e-6;

/// Upper edge of the volatility search bracket (500% annualized).
pub const MAX_VOL: f64 = 5.0;

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.cdf(x)
}

/// Black-Scholes European call price with continuous dividend yield.
///
/// `d1 = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)`, `d2 = d1 - σ√T`,
/// `price = S·e^(-qT)·Φ(d1) - K·e^(-rT)·Φ(d2)`.
///
/// Callers must guarantee `spot > 0`, `strike > 0`, `vol > 0`, `time > 0`;
/// the division by `σ√T` is undefined otherwise. The implied-volatility
/// path guards its domain before calling in here.
pub fn call_price(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    let sqrt_t = time.sqrt();
    let d1 = ((spot / strike).ln() + (rate - div + 0.5 * vol * vol) * time) / (vol * sqrt_t);
    let d2 = d1 - vol * sqrt_t;

    spot * (-div * time).exp() * norm_cdf(d1) - strike * (-rate * time).exp() * norm_cdf(d2)
}

/// Implied volatility of a call quote via Brent's method on `(MIN_VOL, MAX_VOL)`.
///
/// Returns `VolError::Numerical` when no solve domain exists (`time <= 0`
/// or `market_price <= 0`), when the quoted price is outside the range
/// achievable for any volatility in the bracket, or when the solver
/// exhausts its iteration budget.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    time: f64,
) -> VolResult<f64> {
    if time <= 0.0 {
        return Err(VolError::numerical("non-positive time to expiration"));
    }
    if market_price <= 0.0 {
        return Err(VolError::numerical("non-positive option price"));
    }
    if spot <= 0.0 || strike <= 0.0 {
        return Err(VolError::invalid_input("non-positive spot or strike"));
    }

    let objective = |vol: f64| call_price(spot, strike, rate, div, vol, time) - market_price;

    brent::find_root(
        objective,
        MIN_VOL,
        MAX_VOL,
        brent::DEFAULT_TOL,
        brent::DEFAULT_MAX_ITER,
    )
}
