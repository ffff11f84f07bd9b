//! Volatility surface snapshot types
//!
//! A snapshot is one timestamped, complete surface for one instrument:
//! the market context it was taken under plus one row per solved quote.
//! Snapshots are immutable once created and are the unit of persistence
//! and of later retrieval/replay.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::quote::MarketContext;

/// One solved point of the implied-volatility surface.
///
/// `implied_volatility` is a percentage (e.g. 23.5 for 23.5%); points whose
/// solve failed are dropped upstream, never stored as NaN. Every stored
/// point has `time_to_expiration > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub strike: f64,
    pub expiration: NaiveDate,
    pub days_to_expiration: i64,
    /// Year fraction, ACT/365 fixed
    pub time_to_expiration: f64,
    /// Implied volatility in percent
    pub implied_volatility: f64,
    /// Strike divided by spot; 1.0 is at-the-money
    pub moneyness: f64,
}

/// A complete surface sample for one instrument at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub context: MarketContext,
    /// Surface rows, ordered by strike ascending
    pub points: Vec<SurfacePoint>,
}

impl SurfaceSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        context: MarketContext,
        points: Vec<SurfacePoint>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            context,
            points,
        }
    }
}

/// A tracked underlying. Only active instruments are sampled by the
/// scheduled snapshot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub is_active: bool,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            is_active: true,
        }
    }
}
