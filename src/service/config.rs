//! Service configuration
//!
//! Read once at startup. Every knob has a documented default so the
//! service runs with no environment at all; malformed values log a
//! warning and fall back rather than aborting.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Runtime configuration for the snapshot service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Annualized risk-free rate (decimal)
    pub risk_free_rate: f64,
    /// Annualized dividend yield (decimal)
    pub dividend_yield: f64,
    /// Lower strike bound as percent of spot
    pub min_strike_pct: f64,
    /// Upper strike bound as percent of spot
    pub max_strike_pct: f64,
    /// Interval between scheduled snapshot cycles
    pub snapshot_interval: Duration,
    /// Expirations this many days out or closer are excluded; their
    /// volatilities are numerically unstable and economically noisy
    pub min_days_to_expiration: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0431,
            dividend_yield: 0.0127,
            min_strike_pct: 80.0,
            max_strike_pct: 120.0,
            snapshot_interval: Duration::from_secs(60 * 60),
            min_days_to_expiration: 7,
        }
    }
}

impl ServiceConfig {
    /// Scheduled-job defaults overlaid with recognized environment
    /// variables: `RISK_FREE_RATE`, `DIVIDEND_YIELD`, `MIN_STRIKE_PCT`,
    /// `MAX_STRIKE_PCT`, `SNAPSHOT_INTERVAL_MINUTES`,
    /// `MIN_DAYS_TO_EXPIRATION`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            risk_free_rate: env_or("RISK_FREE_RATE", defaults.risk_free_rate),
            dividend_yield: env_or("DIVIDEND_YIELD", defaults.dividend_yield),
            min_strike_pct: env_or("MIN_STRIKE_PCT", defaults.min_strike_pct),
            max_strike_pct: env_or("MAX_STRIKE_PCT", defaults.max_strike_pct),
            snapshot_interval: Duration::from_secs(
                60 * env_or("SNAPSHOT_INTERVAL_MINUTES", 60u64),
            ),
            min_days_to_expiration: env_or(
                "MIN_DAYS_TO_EXPIRATION",
                defaults.min_days_to_expiration,
            ),
        }
    }

    /// Wide-open strike band for interactive exploration, where the
    /// caller wants every quoted strike rather than the scheduled job's
    /// near-the-money band.
    pub fn interactive() -> Self {
        Self {
            min_strike_pct: 0.01,
            max_strike_pct: 12_000.0,
            ..Self::default()
        }
    }
}

fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {}={:?}", name, raw);
            default
        }),
        Err(_) => default,
    }
}
