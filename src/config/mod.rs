//! Configuration models for scheduler pacing.

pub mod settings;

pub use settings::SchedulerSettings;
