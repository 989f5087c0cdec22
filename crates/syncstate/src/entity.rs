// ── Routing and identity primitives ──
//
// EntityName is the dispatch-routing key for a store instance, Timestamp
// is the logical stamp carried by terminal actions, and Identify is the
// contract indexed storage places on resource types.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ── EntityName ──────────────────────────────────────────────────────

/// Routing key identifying which store instance an action targets.
///
/// An explicit type rather than a bare string so unrelated stores sharing
/// one dispatch stream cannot collide by accident. An optional namespace
/// prefixes the name (`"admin:rules"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Routing key under a namespace prefix.
    pub fn namespaced(namespace: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self(format!("{}:{}", namespace.as_ref(), name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Timestamp ───────────────────────────────────────────────────────

/// Millisecond stamp attached to terminal fetch/update actions.
///
/// Populates `last_fetch` on success. A logical value: the reducer only
/// stores it, never compares stamps to order racing actions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current wall-clock stamp.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Identify ────────────────────────────────────────────────────────

/// Id accessor required of resources held in indexed storage.
///
/// The id must be non-empty: indexed merges reject a resource whose id is
/// empty rather than storing it under a meaningless key.
pub trait Identify {
    fn id(&self) -> &str;
}
