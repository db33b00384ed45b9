//! Scheduler pacing settings.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable overriding [`SchedulerSettings::general_interval_ms`].
pub const ENV_GENERAL_INTERVAL_MS: &str = "ADMISSION_GENERAL_INTERVAL_MS";
/// Environment variable overriding [`SchedulerSettings::private_chat_interval_ms`].
pub const ENV_PRIVATE_INTERVAL_MS: &str = "ADMISSION_PRIVATE_INTERVAL_MS";
/// Environment variable overriding [`SchedulerSettings::group_chat_interval_ms`].
pub const ENV_GROUP_INTERVAL_MS: &str = "ADMISSION_GROUP_INTERVAL_MS";
/// Environment variable overriding [`SchedulerSettings::reset_threshold`].
pub const ENV_RESET_THRESHOLD: &str = "ADMISSION_RESET_THRESHOLD";
/// Environment variable overriding [`SchedulerSettings::sweep_event_limit`].
pub const ENV_SWEEP_EVENT_LIMIT: &str = "ADMISSION_SWEEP_EVENT_LIMIT";

/// Pacing configuration for a [`RequestScheduler`](crate::core::RequestScheduler).
///
/// Intervals are stored in milliseconds. The general interval applies to
/// every admission; the private and group intervals apply per conversation
/// and must not be shorter than the general one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Minimum spacing between any two grants, across all scopes.
    #[serde(default = "default_general_interval_ms")]
    pub general_interval_ms: u64,

    /// Minimum spacing between grants for one private conversation.
    #[serde(default = "default_private_chat_interval_ms")]
    pub private_chat_interval_ms: u64,

    /// Minimum spacing between grants for one group conversation.
    #[serde(default = "default_group_chat_interval_ms")]
    pub group_chat_interval_ms: u64,

    /// How many general intervals the pacing cursor may lag behind the
    /// clock before it is snapped forward. Also bounds the burst an idle
    /// scheduler admits at once.
    #[serde(default = "default_reset_threshold")]
    pub reset_threshold: u32,

    /// Maximum timeline entries processed by a single sweep.
    #[serde(default = "default_sweep_event_limit")]
    pub sweep_event_limit: usize,
}

const fn default_general_interval_ms() -> u64 {
    34
}

const fn default_private_chat_interval_ms() -> u64 {
    1000
}

const fn default_group_chat_interval_ms() -> u64 {
    3000
}

const fn default_reset_threshold() -> u32 {
    5
}

const fn default_sweep_event_limit() -> usize {
    1000
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            general_interval_ms: default_general_interval_ms(),
            private_chat_interval_ms: default_private_chat_interval_ms(),
            group_chat_interval_ms: default_group_chat_interval_ms(),
            reset_threshold: default_reset_threshold(),
            sweep_event_limit: default_sweep_event_limit(),
        }
    }
}

impl SchedulerSettings {
    /// Create settings from the three scope intervals, keeping the default
    /// reset threshold and sweep limit.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn new(general: Duration, private_chat: Duration, group_chat: Duration) -> Result<Self, String> {
        let settings = Self::default()
            .with_general_interval(general)
            .with_private_chat_interval(private_chat)
            .with_group_chat_interval(group_chat);
        settings.validate()?;
        Ok(settings)
    }

    /// Set the general interval.
    #[must_use]
    pub fn with_general_interval(mut self, interval: Duration) -> Self {
        self.general_interval_ms = duration_to_ms(interval);
        self
    }

    /// Set the private conversation interval.
    #[must_use]
    pub fn with_private_chat_interval(mut self, interval: Duration) -> Self {
        self.private_chat_interval_ms = duration_to_ms(interval);
        self
    }

    /// Set the group conversation interval.
    #[must_use]
    pub fn with_group_chat_interval(mut self, interval: Duration) -> Self {
        self.group_chat_interval_ms = duration_to_ms(interval);
        self
    }

    /// Set the drift reset threshold, in general intervals.
    #[must_use]
    pub const fn with_reset_threshold(mut self, threshold: u32) -> Self {
        self.reset_threshold = threshold;
        self
    }

    /// Set the per-sweep event limit.
    #[must_use]
    pub const fn with_sweep_event_limit(mut self, limit: usize) -> Self {
        self.sweep_event_limit = limit;
        self
    }

    /// General interval as a `Duration`.
    #[must_use]
    pub const fn general_interval(&self) -> Duration {
        Duration::from_millis(self.general_interval_ms)
    }

    /// Private conversation interval as a `Duration`.
    #[must_use]
    pub const fn private_chat_interval(&self) -> Duration {
        Duration::from_millis(self.private_chat_interval_ms)
    }

    /// Group conversation interval as a `Duration`.
    #[must_use]
    pub const fn group_chat_interval(&self) -> Duration {
        Duration::from_millis(self.group_chat_interval_ms)
    }

    /// Maximum lag of the pacing cursor behind the clock.
    #[must_use]
    pub fn reset_threshold_duration(&self) -> Duration {
        self.general_interval() * self.reset_threshold
    }

    /// Validate interval relationships and limits.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.general_interval_ms == 0 {
            return Err("general_interval_ms must be greater than 0".into());
        }
        if self.private_chat_interval_ms == 0 {
            return Err("private_chat_interval_ms must be greater than 0".into());
        }
        if self.group_chat_interval_ms == 0 {
            return Err("group_chat_interval_ms must be greater than 0".into());
        }
        if self.private_chat_interval_ms < self.general_interval_ms {
            return Err(format!(
                "private_chat_interval_ms ({}) must not be shorter than general_interval_ms ({})",
                self.private_chat_interval_ms, self.general_interval_ms
            ));
        }
        if self.group_chat_interval_ms < self.general_interval_ms {
            return Err(format!(
                "group_chat_interval_ms ({}) must not be shorter than general_interval_ms ({})",
                self.group_chat_interval_ms, self.general_interval_ms
            ));
        }
        if self.reset_threshold == 0 {
            return Err("reset_threshold must be greater than 0".into());
        }
        if self.sweep_event_limit == 0 {
            return Err("sweep_event_limit must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse settings from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load settings from `ADMISSION_*` environment variables, reading a
    /// `.env` file first when one is present. Unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable is not a valid number or the result does not
    /// validate.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(v) = env_number(ENV_GENERAL_INTERVAL_MS)? {
            cfg.general_interval_ms = v;
        }
        if let Some(v) = env_number(ENV_PRIVATE_INTERVAL_MS)? {
            cfg.private_chat_interval_ms = v;
        }
        if let Some(v) = env_number(ENV_GROUP_INTERVAL_MS)? {
            cfg.group_chat_interval_ms = v;
        }
        if let Some(v) = env_number(ENV_RESET_THRESHOLD)? {
            cfg.reset_threshold = v;
        }
        if let Some(v) = env_number(ENV_SWEEP_EVENT_LIMIT)? {
            cfg.sweep_event_limit = v;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn env_number<T>(name: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{name} is not a valid number: {raw:?}"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
