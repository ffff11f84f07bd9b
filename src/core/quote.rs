//! Option quote data
//!
//! Raw per-strike market quotes as delivered by the feed, plus the
//! market parameters that apply to one snapshot attempt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single call-option quote for one strike and expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price
    pub strike: f64,
    /// Expiration date
    pub expiration: NaiveDate,
    /// Bid price
    pub bid: f64,
    /// Ask price
    pub ask: f64,
}

impl OptionQuote {
    pub fn new(strike: f64, expiration: NaiveDate, bid: f64, ask: f64) -> Self {
        Self {
            strike,
            expiration,
            bid,
            ask,
        }
    }

    /// Mid price, the solve target for implied volatility.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// A quote is usable only with a live two-sided market.
    pub fn has_market(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }
}

/// Market parameters fixed for the duration of one snapshot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Spot price of the underlying
    pub spot_price: f64,
    /// Annualized risk-free rate (decimal, e.g. 0.0431)
    pub risk_free_rate: f64,
    /// Annualized dividend yield (decimal)
    pub dividend_yield: f64,
    /// Valuation date used for day counts
    pub as_of: NaiveDate,
}

impl MarketContext {
    pub fn new(spot_price: f64, risk_free_rate: f64, dividend_yield: f64, as_of: NaiveDate) -> Self {
        Self {
            spot_price,
            risk_free_rate,
            dividend_yield,
            as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn exp() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 18).unwrap()
    }

    #[test]
    fn test_mid_price() {
        let q = OptionQuote::new(100.0, exp(), 9.9, 10.1);
        assert!((q.mid() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_quote_is_unusable() {
        assert!(OptionQuote::new(100.0, exp(), 9.9, 10.1).has_market());
        assert!(!OptionQuote::new(100.0, exp(), 0.0, 10.1).has_market());
        assert!(!OptionQuote::new(100.0, exp(), 9.9, 0.0).has_market());
        assert!(!OptionQuote::new(100.0, exp(), -0.05, 0.05).has_market());
    }
}
