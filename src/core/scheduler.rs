//! Public admission facade.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::SchedulerSettings;
use crate::runtime::sweeper::{spawn_sweeper, SweeperHandle};

use super::cancel::CancelToken;
#[cfg(feature = "tokio-runtime")]
use super::control::AdmissionControl;
use super::engine::{Enqueued, SchedulerState, SchedulerStats};
use super::scope::ScopeKey;
use super::waiter::{Admission, Waiter};
use super::SchedulerError;

/// Paces callers so that no scope exceeds its configured request rate.
///
/// Each call to [`admit`](Self::admit) either returns immediately or waits
/// until the caller's scope has a free slot. Callers of the same scope are
/// admitted in the order they arrived.
///
/// The scheduler owns a background sweeper thread. It is stopped by
/// [`stop`](Self::stop) or when the scheduler is dropped.
#[derive(Debug)]
pub struct RequestScheduler {
    settings: SchedulerSettings,
    state: Arc<Mutex<SchedulerState>>,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl RequestScheduler {
    /// Create a scheduler and start its sweeper.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the settings do not validate
    /// - `SchedulerError::Spawn` if the sweeper thread cannot be started
    pub fn new(settings: SchedulerSettings) -> Result<Self, SchedulerError> {
        settings.validate().map_err(SchedulerError::InvalidConfig)?;

        let state = Arc::new(Mutex::new(SchedulerState::new(&settings, Instant::now())));
        let sweeper = spawn_sweeper(Arc::clone(&state), settings.general_interval())?;

        info!(
            general_ms = settings.general_interval_ms,
            private_ms = settings.private_chat_interval_ms,
            group_ms = settings.group_chat_interval_ms,
            "RequestScheduler started"
        );

        Ok(Self {
            settings,
            state,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Settings this scheduler was built with.
    #[must_use]
    pub const fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Wait for admission in `scope`.
    ///
    /// Dropping the returned future before it completes abandons the
    /// request, so a `tokio::time::timeout` around it acts as a deadline.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Cancelled` if `cancel` fires first or the
    ///   scheduler is stopped while waiting
    /// - `SchedulerError::Closed` if the scheduler was already stopped
    #[cfg(feature = "tokio-runtime")]
    pub async fn admit(
        &self,
        scope: impl Into<ScopeKey>,
        cancel: &CancelToken,
    ) -> Result<(), SchedulerError> {
        let Some(waiter) = self.enqueue(scope.into(), cancel)? else {
            return Ok(());
        };
        let guard = AbandonOnDrop(&waiter);
        let outcome = waiter.wait().await;
        drop(guard);
        outcome_to_result(outcome)
    }

    /// Wait for admission in the general scope only.
    ///
    /// # Errors
    ///
    /// Same as [`admit`](Self::admit).
    #[cfg(feature = "tokio-runtime")]
    pub async fn admit_general(&self, cancel: &CancelToken) -> Result<(), SchedulerError> {
        self.admit(ScopeKey::GENERAL, cancel).await
    }

    /// Blocking variant of [`admit`](Self::admit) for callers outside an
    /// async runtime.
    ///
    /// # Errors
    ///
    /// Same as [`admit`](Self::admit).
    pub fn admit_blocking(
        &self,
        scope: impl Into<ScopeKey>,
        cancel: &CancelToken,
    ) -> Result<(), SchedulerError> {
        match self.enqueue(scope.into(), cancel)? {
            Some(waiter) => outcome_to_result(waiter.wait_blocking()),
            None => Ok(()),
        }
    }

    /// Returns `None` when granted synchronously, otherwise the waiter to
    /// suspend on.
    fn enqueue(
        &self,
        scope: ScopeKey,
        cancel: &CancelToken,
    ) -> Result<Option<Arc<Waiter>>, SchedulerError> {
        if cancel.is_cancelled() {
            return Err(SchedulerError::Cancelled);
        }
        let interval = scope.interval(&self.settings);

        let enqueued = self.state.lock().admit(scope, interval, Instant::now());
        match enqueued {
            Enqueued::Granted => Ok(None),
            Enqueued::Closed => Err(SchedulerError::Closed),
            Enqueued::Queued(waiter) => {
                debug!(%scope, "admission queued");
                if !cancel.register(&waiter) {
                    waiter.try_resolve(Admission::Cancelled);
                }
                Ok(Some(waiter))
            }
        }
    }

    /// Stop the sweeper and cancel every pending admission. Later calls to
    /// `admit` fail with `SchedulerError::Closed`. Idempotent.
    pub fn stop(&self) {
        let Some(cancelled) = self.state.lock().close() else {
            return;
        };
        if let Some(mut sweeper) = self.sweeper.lock().take() {
            sweeper.shutdown();
        }
        info!(cancelled, "RequestScheduler stopped");
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.lock().is_closed()
    }

    /// Timeline entries plus active scopes. Zero means all pending work has
    /// drained and every scope is idle.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.state.lock().tracked_count()
    }

    /// Snapshot of internal counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.state.lock().stats()
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait::async_trait]
impl AdmissionControl for RequestScheduler {
    async fn admit_scope(
        &self,
        scope: ScopeKey,
        cancel: &CancelToken,
    ) -> Result<(), SchedulerError> {
        self.admit(scope, cancel).await
    }
}

impl Drop for RequestScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Marks the waiter cancelled if the admitting future is dropped early.
#[cfg(feature = "tokio-runtime")]
struct AbandonOnDrop<'a>(&'a Waiter);

#[cfg(feature = "tokio-runtime")]
impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        self.0.try_resolve(Admission::Cancelled);
    }
}

const fn outcome_to_result(outcome: Admission) -> Result<(), SchedulerError> {
    match outcome {
        Admission::Granted => Ok(()),
        Admission::Cancelled => Err(SchedulerError::Cancelled),
    }
}
