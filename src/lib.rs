//! # Prometheus Admission
//!
//! Client-side admission control for chat-bot style APIs that enforce
//! several rate limits at once.
//!
//! Messaging platforms typically cap a bot globally (about 30 requests per
//! second), per private chat (about one per second) and per group chat
//! (about twenty per minute). Exceeding any of them gets requests rejected
//! or the bot throttled. This crate sits in front of the HTTP client and
//! makes each caller wait until its request can go out without breaking
//! any of those limits.
//!
//! ## Scopes
//!
//! Every request is charged to a [`ScopeKey`](core::ScopeKey):
//!
//! - `0` is the general scope, for calls not tied to a chat
//! - positive keys are private chats
//! - negative keys are group chats; usernames hash into this range
//!
//! Callers in the same scope are admitted strictly in arrival order and
//! never closer together than the scope's interval. Across all scopes, one
//! grant is handed out per general interval, with a small burst allowance
//! after the scheduler has been idle.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prometheus_admission::config::SchedulerSettings;
//! use prometheus_admission::core::{CancelToken, RequestScheduler};
//!
//! let scheduler = RequestScheduler::new(SchedulerSettings::default())?;
//! let cancel = CancelToken::new();
//!
//! // Waits up to one private-chat interval if this chat was just used.
//! scheduler.admit(123_456_789_i64, &cancel).await?;
//! send_message(123_456_789, "hello").await;
//!
//! // Shut down: pending callers get `SchedulerError::Cancelled`.
//! scheduler.stop();
//! ```
//!
//! Blocking callers use [`RequestScheduler::admit_blocking`](core::RequestScheduler::admit_blocking).
//! [`RateLimitedClient`](runtime::RateLimitedClient) wraps an arbitrary
//! client so that every call goes through admission first.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Scope resolution, pacing state and the admission facade.
pub mod core;
/// Scheduler settings loaded from code, JSON or the environment.
pub mod config;
/// Background sweeper and async client surface.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::SchedulerSettings;
pub use crate::core::{
    AdmissionControl, CancelToken, ChatId, RequestScheduler, SchedulerError, SchedulerStats,
    ScopeKey, ScopeKind,
};
#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::RateLimitedClient;
