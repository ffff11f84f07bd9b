//! Scheduled snapshot lifecycle
//!
//! A background timer thread fires one snapshot cycle per interval.
//! Cycles run inline on that thread, so a cycle that overruns the
//! interval simply absorbs the tick that would have overlapped; there is
//! never more than one cycle in flight. The scheduler is an owned handle
//! returned from `start`, not ambient process state.
//!
//! `start` runs one cycle synchronously before the timer begins, so the
//! system has data from the moment it is up.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info};

use super::snapshot::SnapshotRunner;
use crate::core::{VolError, VolResult};

/// Lifecycle states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Owned handle to the running scheduler.
pub struct SnapshotScheduler {
    state: Arc<Mutex<SchedulerState>>,
    shutdown: mpsc::Sender<()>,
    timer: Option<JoinHandle<()>>,
}

impl SnapshotScheduler {
    /// Run one cycle now, then fire one cycle per `interval` until
    /// stopped.
    ///
    /// The immediate cycle's per-symbol failures are ordinary outcomes,
    /// but failing to read the instrument list at startup is fatal and
    /// surfaces here rather than behind the timer.
    pub fn start(runner: Arc<SnapshotRunner>, interval: Duration) -> VolResult<Self> {
        let state = Arc::new(Mutex::new(SchedulerState::Starting));

        let outcomes = runner.run_cycle_for_active()?;
        info!(symbols = outcomes.len(), "initial snapshot cycle complete");

        let (shutdown, ticks) = mpsc::channel();
        let thread_state = Arc::clone(&state);
        let timer = thread::spawn(move || loop {
            match ticks.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = runner.run_cycle_for_active() {
                        error!(error = %e, "scheduled snapshot cycle failed");
                    }
                }
                // Stop signal, or the handle vanished without one
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    *lock_state(&thread_state) = SchedulerState::Stopped;
                    break;
                }
            }
        });

        *lock_state(&state) = SchedulerState::Running;
        info!(interval_secs = interval.as_secs(), "scheduler started");

        Ok(Self {
            state,
            shutdown,
            timer: Some(timer),
        })
    }

    pub fn state(&self) -> SchedulerState {
        *lock_state(&self.state)
    }

    /// Signal the timer and wait for it to wind down. Any in-flight cycle
    /// finishes first; its duration is bounded by the feed's per-request
    /// timeouts. Idempotent: stopping a stopped scheduler is a no-op.
    pub fn stop(&mut self) -> VolResult<()> {
        let Some(timer) = self.timer.take() else {
            return Ok(());
        };

        *lock_state(&self.state) = SchedulerState::Stopping;
        // The timer may already have exited on a disconnect; either way
        // the join below observes its terminal state.
        let _ = self.shutdown.send(());

        timer
            .join()
            .map_err(|_| VolError::scheduler("timer thread panicked"))?;

        info!("scheduler stopped");
        Ok(())
    }
}

fn lock_state(state: &Mutex<SchedulerState>) -> std::sync::MutexGuard<'_, SchedulerState> {
    // A poisoned state lock means the timer thread panicked mid-store of
    // a Copy value; the value itself is still coherent.
    state.lock().unwrap_or_else(|e| e.into_inner())
}
