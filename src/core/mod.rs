//! Scope resolution, pacing state and the admission facade.

pub mod error;
pub mod scope;
pub mod cancel;
pub mod control;
pub mod scheduler;
pub(crate) mod bucket;
pub(crate) mod engine;
pub(crate) mod timeline;
pub(crate) mod waiter;

pub use cancel::CancelToken;
pub use control::AdmissionControl;
pub use engine::SchedulerStats;
pub use error::{AppResult, SchedulerError};
pub use scheduler::RequestScheduler;
pub use scope::{ChatId, ScopeKey, ScopeKind};
