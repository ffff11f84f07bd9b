//! Numerical models
//!
//! - black_scholes: call pricing and implied-volatility inversion
//! - brent: the bracketed root finder backing the inversion

pub mod black_scholes;
pub mod brent;

pub use black_scholes::{call_price, implied_volatility, norm_cdf, MAX_VOL, MIN_VOL};
pub use brent::find_root;
