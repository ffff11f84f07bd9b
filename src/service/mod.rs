//! Scheduled snapshot service
//!
//! Wiring for the periodic pipeline: configuration, the external feed
//! and store collaborators, the per-cycle orchestrator, and the timer
//! lifecycle around it.

pub mod config;
pub mod feed;
pub mod scheduler;
pub mod snapshot;
pub mod storage;

pub use config::ServiceConfig;
pub use feed::{QuoteFeed, YahooFeed};
pub use scheduler::{SchedulerState, SnapshotScheduler};
pub use snapshot::{CycleOutcome, SnapshotRunner, SymbolOutcome};
pub use storage::{MemoryStore, SnapshotStore};
