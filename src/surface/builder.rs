//! Surface construction from raw quotes
//!
//! Turns a batch of noisy bid/ask quotes plus one `MarketContext` into
//! cleaned surface rows. Each quote is handled by a pure per-row mapping:
//! quotes that have no two-sided market, fall outside the strike band, or
//! fail the volatility solve are dropped, never emitted as NaN rows.

use tracing::debug;

use crate::core::{MarketContext, OptionQuote, SurfacePoint};
use crate::models::black_scholes;

/// Days-per-year convention for time to expiration (ACT/365 fixed).
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Solve one quote against the market context.
///
/// Returns `None` for quotes that cannot produce a valid surface point:
/// expired or same-day expirations (`time_to_expiration <= 0`) and
/// non-convergent solves. This is the single site where implied
/// volatility is converted to percent.
pub fn solve_point(quote: &OptionQuote, ctx: &MarketContext) -> Option<SurfacePoint> {
    let days = (quote.expiration - ctx.as_of).num_days();
    let time = days as f64 / DAYS_PER_YEAR;

    let vol = black_scholes::implied_volatility(
        quote.mid(),
        ctx.spot_price,
        quote.strike,
        ctx.risk_free_rate,
        ctx.dividend_yield,
        time,
    )
    .ok()?;

    Some(SurfacePoint {
        strike: quote.strike,
        expiration: quote.expiration,
        days_to_expiration: days,
        time_to_expiration: time,
        implied_volatility: vol * 100.0,
        moneyness: quote.strike / ctx.spot_price,
    })
}

/// Build the cleaned surface for one instrument.
///
/// Quotes are kept when `bid > 0 && ask > 0` and the strike lies within
/// `[spot * min_strike_pct / 100, spot * max_strike_pct / 100]`; survivors
/// are solved row by row. The result is sorted by strike ascending (ties
/// by expiration) for deterministic downstream slicing. An empty result
/// means nothing survived; the caller decides whether that fails the
/// snapshot.
pub fn build_surface(
    quotes: &[OptionQuote],
    ctx: &MarketContext,
    min_strike_pct: f64,
    max_strike_pct: f64,
) -> Vec<SurfacePoint> {
    let min_strike = ctx.spot_price * (min_strike_pct / 100.0);
    let max_strike = ctx.spot_price * (max_strike_pct / 100.0);

    let candidates: Vec<&OptionQuote> = quotes
        .iter()
        .filter(|q| q.has_market())
        .filter(|q| q.strike >= min_strike && q.strike <= max_strike)
        .collect();

    let mut points: Vec<SurfacePoint> = candidates
        .iter()
        .filter_map(|&q| solve_point(q, ctx))
        .collect();

    debug!(
        total = quotes.len(),
        candidates = candidates.len(),
        solved = points.len(),
        "surface build"
    );

    points.sort_by(|a, b| {
        a.strike
            .total_cmp(&b.strike)
            .then_with(|| a.expiration.cmp(&b.expiration))
    });

    points
}
