//! Snapshot orchestration
//!
//! One cycle walks the tracked symbols sequentially, pulls market data
//! for each, builds the surface, and hands the result to the store.
//! Sequential iteration is deliberate: it bounds the request rate against
//! the upstream feed and keeps partial failures attributable to one
//! symbol. The failure-isolation contract is that nothing a single
//! symbol does, bad feed responses and storage rejections included,
//! stops the cycle for the remaining symbols.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use super::config::ServiceConfig;
use super::feed::QuoteFeed;
use super::storage::SnapshotStore;
use crate::core::{MarketContext, OptionQuote, SurfaceSnapshot, VolError, VolResult};
use crate::surface::build_surface;

/// What happened to one symbol during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Snapshot persisted under this id.
    Saved(i64),
    /// Nothing qualified: no usable expirations, spot, or surface points.
    NoData,
    /// The symbol failed; the cycle went on without it.
    Failed(String),
}

/// Per-symbol result of a cycle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub outcome: CycleOutcome,
}

/// Drives the fetch → solve → persist pipeline.
pub struct SnapshotRunner {
    feed: Arc<dyn QuoteFeed>,
    store: Arc<dyn SnapshotStore>,
    config: ServiceConfig,
}

impl SnapshotRunner {
    pub fn new(
        feed: Arc<dyn QuoteFeed>,
        store: Arc<dyn SnapshotStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            feed,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fetch quotes and build a snapshot for one symbol.
    ///
    /// `Ok(None)` means nothing qualified this cycle: no expirations far
    /// enough out, no spot close, or an empty surface after filtering.
    /// That is a skipped symbol, not an error. A snapshot is never
    /// returned with zero points.
    pub fn fetch_snapshot(&self, symbol: &str) -> VolResult<Option<SurfaceSnapshot>> {
        let now = Utc::now();
        let today = now.date_naive();
        let cutoff = today + Duration::days(self.config.min_days_to_expiration);

        let expirations: Vec<_> = self
            .feed
            .expirations(symbol)?
            .into_iter()
            .filter(|&d| d > cutoff)
            .collect();

        if expirations.is_empty() {
            warn!(symbol, "no qualifying option expirations");
            return Ok(None);
        }

        let spot = match self.feed.spot_price(symbol) {
            Ok(spot) => spot,
            // Decoded-but-empty payloads mean there is simply no close to
            // use this cycle; transport failures stay errors.
            Err(VolError::Data(msg)) => {
                warn!(symbol, %msg, "no spot price data");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut quotes: Vec<OptionQuote> = Vec::new();
        for expiration in &expirations {
            match self.feed.option_chain(symbol, *expiration) {
                Ok(chain) => quotes.extend(chain),
                // One bad expiration must not abort the whole symbol
                Err(e) => {
                    warn!(symbol, %expiration, error = %e, "failed to fetch option chain");
                }
            }
        }

        if quotes.is_empty() {
            warn!(symbol, "no option data available after filtering");
            return Ok(None);
        }

        let ctx = MarketContext::new(
            spot,
            self.config.risk_free_rate,
            self.config.dividend_yield,
            today,
        );
        let points = build_surface(
            &quotes,
            &ctx,
            self.config.min_strike_pct,
            self.config.max_strike_pct,
        );

        if points.is_empty() {
            warn!(symbol, "no valid implied volatility data");
            return Ok(None);
        }

        Ok(Some(SurfaceSnapshot::new(symbol, now, ctx, points)))
    }

    fn run_symbol(&self, symbol: &str) -> CycleOutcome {
        match self.fetch_snapshot(symbol) {
            Ok(None) => CycleOutcome::NoData,
            Ok(Some(snapshot)) => match self.store.save_snapshot(&snapshot) {
                Ok(id) => {
                    info!(symbol, id, points = snapshot.points.len(), "saved snapshot");
                    CycleOutcome::Saved(id)
                }
                Err(e) => {
                    error!(symbol, error = %e, "failed to save snapshot");
                    CycleOutcome::Failed(e.to_string())
                }
            },
            Err(e) => {
                error!(symbol, error = %e, "error fetching volatility data");
                CycleOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run one cycle over an explicit symbol list.
    pub fn run_cycle(&self, symbols: &[String]) -> Vec<SymbolOutcome> {
        info!(symbols = symbols.len(), "starting snapshot cycle");
        symbols
            .iter()
            .map(|symbol| SymbolOutcome {
                symbol: symbol.clone(),
                outcome: self.run_symbol(symbol),
            })
            .collect()
    }

    /// Run one cycle over the store's active instruments.
    ///
    /// Failing to read the instrument list is the one cycle-level error:
    /// there is nothing to iterate.
    pub fn run_cycle_for_active(&self) -> VolResult<Vec<SymbolOutcome>> {
        let symbols = self.store.active_instruments()?;
        if symbols.is_empty() {
            warn!("no active instruments");
        }
        Ok(self.run_cycle(&symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VolError;
    use crate::service::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    /// Scripted feed: serves one chain per expiration, with configurable
    /// per-symbol and per-expiration failures.
    struct StubFeed {
        spot: f64,
        expirations: Vec<NaiveDate>,
        chain: Vec<(f64, f64, f64)>,
        broken_symbols: HashSet<String>,
        broken_expirations: HashSet<NaiveDate>,
    }

    impl StubFeed {
        fn new(days_out: &[i64]) -> Self {
            let today = Utc::now().date_naive();
            Self {
                spot: 100.0,
                expirations: days_out.iter().map(|&d| today + Duration::days(d)).collect(),
                chain: vec![(90.0, 11.4, 11.8), (100.0, 4.9, 5.1), (110.0, 1.4, 1.6)],
                broken_symbols: HashSet::new(),
                broken_expirations: HashSet::new(),
            }
        }

        fn breaking(mut self, symbol: &str) -> Self {
            self.broken_symbols.insert(symbol.to_string());
            self
        }
    }

    impl QuoteFeed for StubFeed {
        fn expirations(&self, symbol: &str) -> VolResult<Vec<NaiveDate>> {
            if self.broken_symbols.contains(symbol) {
                return Err(VolError::feed("connection reset"));
            }
            Ok(self.expirations.clone())
        }

        fn option_chain(&self, _symbol: &str, expiration: NaiveDate) -> VolResult<Vec<OptionQuote>> {
            if self.broken_expirations.contains(&expiration) {
                return Err(VolError::feed("timed out"));
            }
            Ok(self
                .chain
                .iter()
                .map(|&(strike, bid, ask)| OptionQuote::new(strike, expiration, bid, ask))
                .collect())
        }

        fn spot_price(&self, _symbol: &str) -> VolResult<f64> {
            Ok(self.spot)
        }
    }

    fn runner(feed: StubFeed) -> (SnapshotRunner, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let runner = SnapshotRunner::new(
            Arc::new(feed),
            Arc::clone(&store) as Arc<dyn SnapshotStore>,
            ServiceConfig::default(),
        );
        (runner, store)
    }

    #[test]
    fn test_cycle_saves_snapshot() {
        let (runner, store) = runner(StubFeed::new(&[30, 60]));
        let outcomes = runner.run_cycle(&["SPY".to_string()]);

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].outcome, CycleOutcome::Saved(_)));

        let (earliest, latest) = store.time_range("SPY").unwrap().unwrap();
        assert_eq!(earliest, latest);
    }

    #[test]
    fn test_failure_isolation_between_symbols() {
        let (runner, _store) = runner(StubFeed::new(&[30, 60]).breaking("AAA"));
        let outcomes = runner.run_cycle(&["AAA".to_string(), "BBB".to_string()]);

        assert_eq!(outcomes[0].symbol, "AAA");
        assert!(matches!(outcomes[0].outcome, CycleOutcome::Failed(_)));
        assert_eq!(outcomes[1].symbol, "BBB");
        assert!(matches!(outcomes[1].outcome, CycleOutcome::Saved(_)));
    }

    #[test]
    fn test_near_dated_expirations_excluded() {
        // Everything expires within the 7-day cutoff
        let (runner, _store) = runner(StubFeed::new(&[2, 5, 7]));
        let outcomes = runner.run_cycle(&["SPY".to_string()]);
        assert_eq!(outcomes[0].outcome, CycleOutcome::NoData);
    }

    #[test]
    fn test_bad_expiration_skipped_not_fatal() {
        let mut feed = StubFeed::new(&[30, 60]);
        feed.broken_expirations.insert(feed.expirations[0]);
        let (runner, store) = runner(feed);

        let outcomes = runner.run_cycle(&["SPY".to_string()]);
        assert!(matches!(outcomes[0].outcome, CycleOutcome::Saved(_)));

        // Only the surviving expiration contributed points
        let now = Utc::now();
        let snaps = store
            .snapshots_in_range("SPY", now - Duration::hours(1), now + Duration::hours(1))
            .unwrap();
        assert_eq!(snaps.len(), 1);
        let expirations: HashSet<NaiveDate> =
            snaps[0].points.iter().map(|p| p.expiration).collect();
        assert_eq!(expirations.len(), 1);
    }

    #[test]
    fn test_empty_surface_is_no_data_never_persisted() {
        let mut feed = StubFeed::new(&[30]);
        // No two-sided markets anywhere
        feed.chain = vec![(90.0, 0.0, 11.8), (100.0, 4.9, 0.0)];
        let (runner, store) = runner(feed);

        let outcomes = runner.run_cycle(&["SPY".to_string()]);
        assert_eq!(outcomes[0].outcome, CycleOutcome::NoData);
        assert!(store.time_range("SPY").unwrap().is_none());
    }

    #[test]
    fn test_run_cycle_for_active() {
        let (runner, store) = runner(StubFeed::new(&[30]));
        store.add_instrument("SPY").unwrap();
        store.add_instrument("QQQ").unwrap();
        store.set_instrument_active("QQQ", false).unwrap();

        let outcomes = runner.run_cycle_for_active().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].symbol, "SPY");
    }

    #[test]
    fn test_snapshot_points_sorted_and_positive_time() {
        let (runner, _store) = runner(StubFeed::new(&[30, 60]));
        let snapshot = runner.fetch_snapshot("SPY").unwrap().unwrap();

        assert!(!snapshot.points.is_empty());
        assert!(snapshot.points.iter().all(|p| p.time_to_expiration > 0.0));
        assert!(snapshot
            .points
            .windows(2)
            .all(|w| w[0].strike <= w[1].strike));
    }
}
