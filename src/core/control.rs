//! Admission abstraction used by client wrappers.

use async_trait::async_trait;

use super::{CancelToken, ScopeKey, SchedulerError};

/// Something that can make a caller wait for its turn in a scope.
///
/// [`RequestScheduler`](super::RequestScheduler) is the production
/// implementation. Wrappers such as
/// [`RateLimitedClient`](crate::runtime::RateLimitedClient) depend on this
/// trait so tests can substitute a stub.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_admission::core::{AdmissionControl, CancelToken, ScopeKey, SchedulerError};
///
/// struct Unlimited;
///
/// #[async_trait]
/// impl AdmissionControl for Unlimited {
///     async fn admit_scope(&self, _scope: ScopeKey, _cancel: &CancelToken) -> Result<(), SchedulerError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    /// Wait until a request in `scope` may be sent.
    ///
    /// # Errors
    ///
    /// Returns an error when the wait was cancelled or the controller no
    /// longer admits requests.
    async fn admit_scope(&self, scope: ScopeKey, cancel: &CancelToken)
        -> Result<(), SchedulerError>;
}

#[async_trait]
impl<T> AdmissionControl for std::sync::Arc<T>
where
    T: AdmissionControl + ?Sized,
{
    async fn admit_scope(
        &self,
        scope: ScopeKey,
        cancel: &CancelToken,
    ) -> Result<(), SchedulerError> {
        (**self).admit_scope(scope, cancel).await
    }
}
