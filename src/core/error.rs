//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by the admission scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Settings were rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The caller cancelled the admission before it was granted.
    #[error("admission cancelled")]
    Cancelled,
    /// The scheduler has been stopped and no longer admits callers.
    #[error("scheduler closed")]
    Closed,
    /// The background sweeper thread could not be started.
    #[error("failed to start sweeper: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
