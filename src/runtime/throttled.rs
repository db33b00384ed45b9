//! Client wrapper that waits for admission before every call.

use std::future::Future;
use std::sync::Arc;

use crate::core::{AdmissionControl, CancelToken, RequestScheduler, SchedulerError, ScopeKey};

/// Pairs an inner client with a shared admission controller.
///
/// Each [`call`](Self::call) first waits for the scope's turn, then runs the
/// supplied operation against the inner client. Clones share both the
/// client and the controller.
///
/// ```rust,ignore
/// let scheduler = Arc::new(RequestScheduler::new(SchedulerSettings::default())?);
/// let client = RateLimitedClient::new(http_client, scheduler);
/// let reply = client
///     .call(chat_id, &cancel, |api| async move { api.send_message(chat_id, "hi").await })
///     .await?;
/// ```
#[derive(Debug)]
pub struct RateLimitedClient<C, A = RequestScheduler> {
    inner: Arc<C>,
    control: Arc<A>,
}

impl<C, A> Clone for RateLimitedClient<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            control: Arc::clone(&self.control),
        }
    }
}

impl<C> RateLimitedClient<C, RequestScheduler> {
    /// Wrap `inner`, pacing it with `scheduler`.
    pub fn new(inner: C, scheduler: Arc<RequestScheduler>) -> Self {
        Self::with_control(inner, scheduler)
    }
}

impl<C, A> RateLimitedClient<C, A>
where
    A: AdmissionControl,
{
    /// Wrap `inner`, pacing it with an arbitrary controller.
    pub fn with_control(inner: C, control: Arc<A>) -> Self {
        Self {
            inner: Arc::new(inner),
            control,
        }
    }

    /// The wrapped client, for calls that need no pacing.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The shared admission controller.
    #[must_use]
    pub const fn control(&self) -> &Arc<A> {
        &self.control
    }

    /// Wait for admission in `scope`, then run `op` against the client.
    ///
    /// `op` receives a shared handle so the future it returns may hold on
    /// to the client. It is never invoked when admission fails.
    ///
    /// # Errors
    ///
    /// Propagates the admission error from the controller.
    pub async fn call<S, F, Fut, T>(
        &self,
        scope: S,
        cancel: &CancelToken,
        op: F,
    ) -> Result<T, SchedulerError>
    where
        S: Into<ScopeKey>,
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = T>,
    {
        self.control.admit_scope(scope.into(), cancel).await?;
        Ok(op(Arc::clone(&self.inner)).await)
    }
}
