//! Background sweeper and async client surface.

pub(crate) mod sweeper;
#[cfg(feature = "tokio-runtime")]
pub mod throttled;

#[cfg(feature = "tokio-runtime")]
pub use throttled::RateLimitedClient;
