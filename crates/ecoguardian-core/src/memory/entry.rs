//! Entry metadata and the snapshot types returned by bank queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Context tags attached to an entry at store time, e.g. `{"city": "Paris"}`.
pub type Context = BTreeMap<String, String>;

/// Build a [`Context`] from string pairs.
pub fn context<K, V, I>(pairs: I) -> Context
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Per-entry bookkeeping. Created and destroyed together with the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Time of the last `store` or `update`.
    pub timestamp: DateTime<Utc>,
    /// Namespace the entry was stored under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub context: Context,
    /// Byte length of the value's JSON serialization.
    pub size: usize,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl EntryMetadata {
    pub(crate) fn fresh(
        now: DateTime<Utc>,
        category: Option<String>,
        context: Context,
        size: usize,
    ) -> Self {
        Self {
            timestamp: now,
            category,
            context,
            size,
            access_count: 0,
            last_accessed: None,
        }
    }

    /// Whole days elapsed since `timestamp`, floored and never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_days().max(0)
    }
}

/// A copy of one entry as returned by context, recency and category queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub key: String,
    pub value: Value,
    pub metadata: EntryMetadata,
}

/// Which part of an entry satisfied a text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Key,
    Value,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key => write!(f, "key"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// One result of [`MemoryBank::search`](super::MemoryBank::search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub key: String,
    pub value: Value,
    pub metadata: EntryMetadata,
    pub match_type: MatchType,
}
