//! Dedicated sweeper thread.
//!
//! The sweeper fires once per general interval, granting whatever the
//! timeline says is due. It sleeps on a channel with a deadline rather than
//! a plain sleep so that dropping the sender ends it immediately.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::engine::SchedulerState;
use crate::core::SchedulerError;

/// Owner handle for a running sweeper thread.
#[derive(Debug)]
pub(crate) struct SweeperHandle {
    /// Dropping this wakes the thread and makes it exit.
    shutdown_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the thread and wait for it to exit.
    pub(crate) fn shutdown(&mut self) {
        self.shutdown_tx.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the sweeper for `state`, firing every `period`.
pub(crate) fn spawn_sweeper(
    state: Arc<Mutex<SchedulerState>>,
    period: Duration,
) -> Result<SweeperHandle, SchedulerError> {
    let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
    let join = thread::Builder::new()
        .name("admission-sweeper".into())
        .spawn(move || sweep_loop(&state, &shutdown_rx, period))
        .map_err(|e| SchedulerError::Spawn(e.to_string()))?;
    Ok(SweeperHandle {
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}

fn sweep_loop(state: &Mutex<SchedulerState>, shutdown_rx: &Receiver<()>, period: Duration) {
    debug!(?period, "sweeper started");
    // First sweep fires right away.
    let mut next_tick = Instant::now();
    loop {
        match shutdown_rx.recv_deadline(next_tick) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let report = state.lock().sweep(Instant::now());
        if report.closed {
            break;
        }
        if report.granted > 0 || report.idled > 0 {
            debug!(
                granted = report.granted,
                idled = report.idled,
                processed = report.processed,
                "sweep"
            );
        }
        if report.saturated {
            warn!(limit = report.processed, "sweep hit its event limit; remaining entries deferred");
        }

        // Keep the cadence anchored to the first tick; skip ticks missed
        // while the process was stalled instead of replaying them.
        next_tick += period;
        let now = Instant::now();
        if next_tick <= now {
            next_tick = now + period;
        }
    }
    debug!("sweeper exiting");
}
