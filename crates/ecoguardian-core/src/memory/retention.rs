//! Eviction scoring and the compaction event log.
//!
//! Each entry scores `access_count / (age_days + 1)`. Old entries that were
//! never read score zero and go first; new entries keep their raw access
//! count, which protects them until they have aged.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::EntryMetadata;

/// Fraction of entries removed by an automatic compaction.
pub const DEFAULT_TARGET_REDUCTION: f64 = 0.3;

/// Absorbs float error so `0.3 * 10` never rounds up to 4.
const EVICTION_EPSILON: f64 = 1e-9;

/// Eviction score for one entry at time `now`.
pub fn eviction_score(meta: &EntryMetadata, now: DateTime<Utc>) -> f64 {
    meta.access_count as f64 / (meta.age_days(now) + 1) as f64
}

/// Number of entries a compaction of `len` entries removes: `ceil(len * target)`.
///
/// `target_reduction` is clamped to `[0, 1]`.
pub fn eviction_count(len: usize, target_reduction: f64) -> usize {
    let target = if target_reduction.is_nan() {
        0.0
    } else {
        target_reduction.clamp(0.0, 1.0)
    };
    let wanted = (len as f64 * target - EVICTION_EPSILON).ceil().max(0.0) as usize;
    wanted.min(len)
}

/// Keys ordered from most to least evictable.
///
/// Sorted ascending by score; ties fall back to the older timestamp, then key,
/// so the order is deterministic.
pub fn eviction_order(
    metadata: &BTreeMap<String, EntryMetadata>,
    now: DateTime<Utc>,
) -> Vec<(String, f64)> {
    let mut scored: Vec<(&String, &EntryMetadata, f64)> = metadata
        .iter()
        .map(|(key, meta)| (key, meta, eviction_score(meta, now)))
        .collect();

    scored.sort_by(|(key_a, meta_a, score_a), (key_b, meta_b, score_b)| {
        score_a
            .total_cmp(score_b)
            .then_with(|| meta_a.timestamp.cmp(&meta_b.timestamp))
            .then_with(|| key_a.cmp(key_b))
    });

    scored
        .into_iter()
        .map(|(key, _, score)| (key.clone(), score))
        .collect()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Record of one compaction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionEvent {
    pub timestamp: DateTime<Utc>,
    pub entries_removed: usize,
    pub before_size: usize,
    pub after_size: usize,
    pub reduction_percent: f64,
}

impl CompactionEvent {
    pub fn new(
        timestamp: DateTime<Utc>,
        before_size: usize,
        after_size: usize,
        entries_removed: usize,
    ) -> Self {
        let reduction_percent = if before_size > 0 {
            round2(entries_removed as f64 / before_size as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            timestamp,
            entries_removed,
            before_size,
            after_size,
            reduction_percent,
        }
    }
}

/// Compaction events, optionally capped to the most recent `limit`.
///
/// `total_runs` keeps counting after old events are dropped.
#[derive(Debug, Clone, Default)]
pub struct CompactionHistory {
    events: VecDeque<CompactionEvent>,
    limit: Option<usize>,
    total_runs: u64,
}

impl CompactionHistory {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            events: VecDeque::new(),
            limit,
            total_runs: 0,
        }
    }

    pub fn record(&mut self, event: CompactionEvent) {
        self.total_runs += 1;
        self.events.push_back(event);
        if let Some(limit) = self.limit {
            while self.events.len() > limit {
                self.events.pop_front();
            }
        }
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &CompactionEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&CompactionEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Compactions run since construction, including dropped events.
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }
}
