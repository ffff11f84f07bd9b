//! Snapshot store collaborator
//!
//! Persistence is consumed through the `SnapshotStore` trait; the schema
//! and querying of a durable backend live outside this crate. The bundled
//! `MemoryStore` keeps everything behind one mutex, which makes each
//! snapshot write atomic by construction: readers observe the whole
//! snapshot or none of it.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::core::{Instrument, SurfaceSnapshot, VolError, VolResult};

/// Persistence contract for snapshots and the tracked-instrument set.
pub trait SnapshotStore: Send + Sync {
    /// Persist a whole snapshot atomically; returns its id.
    fn save_snapshot(&self, snapshot: &SurfaceSnapshot) -> VolResult<i64>;

    /// Symbols the scheduled job iterates.
    fn active_instruments(&self) -> VolResult<Vec<String>>;

    /// Register a symbol for tracking (idempotent; re-adding reactivates).
    fn add_instrument(&self, symbol: &str) -> VolResult<()>;

    /// Activate or deactivate a symbol. Returns false if unknown.
    fn set_instrument_active(&self, symbol: &str, active: bool) -> VolResult<bool>;

    /// Earliest and latest snapshot timestamps for a symbol, if any.
    fn time_range(&self, symbol: &str) -> VolResult<Option<(DateTime<Utc>, DateTime<Utc>)>>;

    /// Snapshots within `[start, end]`, ascending by timestamp.
    fn snapshots_in_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> VolResult<Vec<SurfaceSnapshot>>;
}

#[derive(Default)]
struct StoreInner {
    instruments: Vec<Instrument>,
    snapshots: HashMap<String, Vec<(i64, SurfaceSnapshot)>>,
    next_id: i64,
}

/// In-process reference implementation of `SnapshotStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> VolResult<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| VolError::storage("store mutex poisoned"))
    }
}

impl SnapshotStore for MemoryStore {
    fn save_snapshot(&self, snapshot: &SurfaceSnapshot) -> VolResult<i64> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .snapshots
            .entry(snapshot.symbol.clone())
            .or_default()
            .push((id, snapshot.clone()));
        Ok(id)
    }

    fn active_instruments(&self) -> VolResult<Vec<String>> {
        let inner = self.lock()?;
        Ok(inner
            .instruments
            .iter()
            .filter(|i| i.is_active)
            .map(|i| i.symbol.clone())
            .collect())
    }

    fn add_instrument(&self, symbol: &str) -> VolResult<()> {
        let mut inner = self.lock()?;
        match inner.instruments.iter_mut().find(|i| i.symbol == symbol) {
            Some(existing) => existing.is_active = true,
            None => inner.instruments.push(Instrument::new(symbol)),
        }
        Ok(())
    }

    fn set_instrument_active(&self, symbol: &str, active: bool) -> VolResult<bool> {
        let mut inner = self.lock()?;
        match inner.instruments.iter_mut().find(|i| i.symbol == symbol) {
            Some(existing) => {
                existing.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn time_range(&self, symbol: &str) -> VolResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let inner = self.lock()?;
        let Some(snaps) = inner.snapshots.get(symbol) else {
            return Ok(None);
        };
        let earliest = snaps.iter().map(|(_, s)| s.timestamp).min();
        let latest = snaps.iter().map(|(_, s)| s.timestamp).max();
        Ok(earliest.zip(latest))
    }

    fn snapshots_in_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> VolResult<Vec<SurfaceSnapshot>> {
        let inner = self.lock()?;
        let mut matched: Vec<SurfaceSnapshot> = inner
            .snapshots
            .get(symbol)
            .map(|snaps| {
                snaps
                    .iter()
                    .filter(|(_, s)| s.timestamp >= start && s.timestamp <= end)
                    .map(|(_, s)| s.clone())
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_by_key(|s| s.timestamp);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarketContext;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn snapshot(symbol: &str, hour: u32) -> SurfaceSnapshot {
        let ts = Utc.with_ymd_and_hms(2026, 8, 7, hour, 0, 0).unwrap();
        let ctx = MarketContext::new(
            100.0,
            0.0431,
            0.0127,
            NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        );
        SurfaceSnapshot::new(symbol, ts, ctx, Vec::new())
    }

    #[test]
    fn test_instrument_lifecycle() {
        let store = MemoryStore::new();
        store.add_instrument("SPY").unwrap();
        store.add_instrument("QQQ").unwrap();
        assert_eq!(store.active_instruments().unwrap(), vec!["SPY", "QQQ"]);

        assert!(store.set_instrument_active("SPY", false).unwrap());
        assert_eq!(store.active_instruments().unwrap(), vec!["QQQ"]);

        // Re-adding reactivates, unknown symbols report false
        store.add_instrument("SPY").unwrap();
        assert_eq!(store.active_instruments().unwrap(), vec!["SPY", "QQQ"]);
        assert!(!store.set_instrument_active("IWM", false).unwrap());
    }

    #[test]
    fn test_save_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.save_snapshot(&snapshot("SPY", 9)).unwrap();
        let b = store.save_snapshot(&snapshot("SPY", 10)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_time_range() {
        let store = MemoryStore::new();
        assert!(store.time_range("SPY").unwrap().is_none());

        store.save_snapshot(&snapshot("SPY", 10)).unwrap();
        store.save_snapshot(&snapshot("SPY", 14)).unwrap();
        store.save_snapshot(&snapshot("SPY", 12)).unwrap();

        let (earliest, latest) = store.time_range("SPY").unwrap().unwrap();
        assert_eq!(earliest, Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap());
        assert_eq!(latest, Utc.with_ymd_and_hms(2026, 8, 7, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_snapshots_in_range_ascending() {
        let store = MemoryStore::new();
        store.save_snapshot(&snapshot("SPY", 14)).unwrap();
        store.save_snapshot(&snapshot("SPY", 10)).unwrap();
        store.save_snapshot(&snapshot("SPY", 12)).unwrap();
        store.save_snapshot(&snapshot("QQQ", 11)).unwrap();

        let start = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        let found = store
            .snapshots_in_range("SPY", start, start + Duration::hours(3))
            .unwrap();

        let hours: Vec<u32> = found
            .iter()
            .map(|s| {
                use chrono::Timelike;
                s.timestamp.hour()
            })
            .collect();
        assert_eq!(hours, vec![10, 12]);
    }
}
