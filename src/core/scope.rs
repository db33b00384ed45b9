//! Scope keys and the identities that resolve to them.
//!
//! A [`ScopeKey`] selects which pacing state applies to a call. The sign of
//! the key is the only thing the scheduler interprets:
//!
//! - `0` is the general scope shared by every call
//! - positive keys are private (one-to-one) conversations
//! - negative keys are group conversations
//!
//! Conversations addressed by name are hashed into the negative range.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerSettings;

/// Kind of rate-limiting domain a scope key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Global scope (key `0`).
    General,
    /// One-to-one conversation (positive key).
    Private,
    /// Many-participant conversation (negative key).
    Group,
}

/// Opaque identifier of a rate-limiting scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeKey(i64);

impl ScopeKey {
    /// The general (global) scope.
    pub const GENERAL: Self = Self(0);

    /// Wrap a raw key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Classify the key by sign.
    #[must_use]
    pub const fn kind(self) -> ScopeKind {
        if self.0 == 0 {
            ScopeKind::General
        } else if self.0 > 0 {
            ScopeKind::Private
        } else {
            ScopeKind::Group
        }
    }

    /// Map a conversation name to a group scope key.
    ///
    /// Names are compared case-insensitively and a leading `@` is ignored,
    /// so `@Channel` and `channel` share a scope. The result is always
    /// strictly negative.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let normalized = name.strip_prefix('@').unwrap_or(name);
        let mut h = fnv1a64_init();
        for b in normalized.bytes() {
            h = fnv1a64_update(h, b.to_ascii_lowercase());
        }
        // Fold into [1, i64::MAX] and negate.
        let magnitude = i64::try_from(h & (i64::MAX as u64)).unwrap_or(i64::MAX);
        Self(-magnitude.max(1))
    }

    /// Minimum interval between two grants in this scope.
    #[must_use]
    pub fn interval(self, settings: &SchedulerSettings) -> Duration {
        match self.kind() {
            ScopeKind::General => settings.general_interval(),
            ScopeKind::Private => settings.private_chat_interval(),
            ScopeKind::Group => settings.group_chat_interval(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ScopeKey {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<i32> for ScopeKey {
    fn from(raw: i32) -> Self {
        Self(i64::from(raw))
    }
}

impl From<&str> for ScopeKey {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<&ChatId> for ScopeKey {
    fn from(chat: &ChatId) -> Self {
        match chat {
            ChatId::Id(id) => Self(*id),
            ChatId::Username(name) => Self::from_name(name),
        }
    }
}

impl From<ChatId> for ScopeKey {
    fn from(chat: ChatId) -> Self {
        Self::from(&chat)
    }
}

/// Caller-facing conversation identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Stable numeric identifier.
    Id(i64),
    /// Public name without a stable numeric id.
    Username(String),
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(name: &str) -> Self {
        Self::Username(name.to_owned())
    }
}

impl From<String> for ChatId {
    fn from(name: String) -> Self {
        Self::Username(name)
    }
}

// Deterministic 64-bit FNV-1a.
#[inline]
const fn fnv1a64_init() -> u64 {
    14_695_981_039_346_656_037
}

#[inline]
const fn fnv1a64_update(mut h: u64, b: u8) -> u64 {
    h ^= b as u64;
    h = h.wrapping_mul(1_099_511_628_211);
    h
}
