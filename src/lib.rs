//! # Vol Snapshot - Implied Volatility Surface Tracker
//!
//! Periodically samples option-market quotes for a set of tracked
//! instruments, derives an implied-volatility surface from each sample
//! via Black-Scholes inversion, persists the surfaces, and supports
//! later retrieval for visualization and replay.
//!
//! ## Pipeline
//!
//! timer → orchestrator → (feed: expirations, chain, spot) → surface
//! builder → (pricing kernel per row) → cleaned surface rows → store.
//! The grid reconstructor runs on demand against any cleaned surface,
//! live or historical, for rendering.
//!
//! ## Key Components
//!
//! - **Pricing kernel**: closed-form Black-Scholes call pricing and its
//!   inverse via a bracketed Brent solve
//! - **Surface builder**: noisy bid/ask quotes → per-strike,
//!   per-expiration implied-volatility rows
//! - **Grid reconstructor**: sparse surface rows → regular mesh, with
//!   out-of-hull cells left empty
//! - **Snapshot service**: scheduled cycles over the tracked instruments
//!   with per-symbol failure isolation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vol_snapshot::prelude::*;
//!
//! let config = ServiceConfig::from_env();
//! let store = Arc::new(MemoryStore::new());
//! store.add_instrument("SPY").unwrap();
//!
//! let feed = Arc::new(YahooFeed::new().unwrap());
//! let runner = Arc::new(SnapshotRunner::new(feed, store, config.clone()));
//!
//! let mut scheduler = SnapshotScheduler::start(runner, config.snapshot_interval).unwrap();
//! // ... serve until shutdown ...
//! scheduler.stop().unwrap();
//! ```
//!
//! ## What This Service Does NOT Do
//!
//! - Predict future volatility or prices
//! - Price to exchange-grade accuracy (one constant-vol root per quote,
//!   by construction)
//! - Stream intraday ticks; cycles are minutes apart, not milliseconds

pub mod core;
pub mod models;
pub mod service;
pub mod surface;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        Instrument, MarketContext, OptionQuote, SurfacePoint, SurfaceSnapshot, VolError, VolResult,
    };

    // Pricing kernel
    pub use crate::models::{call_price, implied_volatility};

    // Surface construction
    pub use crate::surface::{
        build_surface, reconstruct, GridPoint, GridSurface, DEFAULT_GRID_SIZE,
    };

    // Service
    pub use crate::service::{
        CycleOutcome, MemoryStore, QuoteFeed, SchedulerState, ServiceConfig, SnapshotRunner,
        SnapshotScheduler, SnapshotStore, SymbolOutcome, YahooFeed,
    };
}

// Re-export main types at crate root
pub use crate::core::{VolError, VolResult};
